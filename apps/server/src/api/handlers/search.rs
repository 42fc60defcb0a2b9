//! Inventory search handler
//!
//! `GET /api/cceInventoryItems/search?facilityId=&functionalStatus=&page=&size=&sort=`
//!
//! `sort` may repeat (`sort=type,asc&sort=referenceName,desc`); keys apply in
//! the order given.

use axum::{
    extract::{Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    api::extractors::CurrentUser,
    models::{InventoryRecord, Page, PageRequest, SearchFilters, SortOrder},
    state::AppState,
    Error, Result,
};

pub async fn search_inventory(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(items): Query<Vec<(String, String)>>,
) -> Result<Json<Page<InventoryRecord>>> {
    let (filters, page) = parse_search_items(&items, state.config.search.default_page_size)?;

    let result = state
        .search_service
        .search(user_id, &state.config.search.right_name, &filters, &page)
        .await?;

    Ok(Json(result))
}

/// Split raw query pairs into filters and a page request. Unknown keys are ignored.
pub fn parse_search_items(
    items: &[(String, String)],
    default_page_size: u32,
) -> Result<(SearchFilters, PageRequest)> {
    let mut filters = SearchFilters::default();
    let mut page = PageRequest::new(0, default_page_size);

    for (key, value) in items {
        let value = value.trim();
        match key.as_str() {
            "facilityId" if !value.is_empty() => {
                let id = Uuid::parse_str(value)
                    .map_err(|e| Error::Validation(format!("Invalid facilityId: {e}")))?;
                filters.facility_id = Some(id);
            }
            "functionalStatus" if !value.is_empty() => {
                filters.functional_status = Some(value.parse()?);
            }
            "page" => page.page = parse_number("page", value)?,
            "size" => page.size = parse_number("size", value)?,
            "sort" if !value.is_empty() => page.sort.push(value.parse::<SortOrder>()?),
            _ => {}
        }
    }

    Ok((filters, page))
}

fn parse_number(name: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| Error::Validation(format!("Invalid {name}: {value}")))
}
