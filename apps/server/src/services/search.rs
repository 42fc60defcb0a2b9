//! Search service - permission-scoped inventory search
//!
//! Orchestrates one search by:
//! - Resolving the caller's scope for the requested right from cached permission strings
//! - Building count and select queries from that scope and the caller's filters
//! - Executing both against the inventory store and assembling the page

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{InventoryStore, SearchQueryBuilder},
    metrics,
    models::{InventoryRecord, Page, PageRequest, SearchFilters},
    permissions::{PermissionScopeResolver, PermissionStringCache},
    Error, Result,
};

/// Search service coordinating scope resolution and query execution
pub struct InventorySearchService {
    permissions: Arc<PermissionStringCache>,
    resolver: PermissionScopeResolver,
    query_builder: SearchQueryBuilder,
    store: Arc<dyn InventoryStore>,
    max_page_size: u32,
}

impl InventorySearchService {
    pub fn new(
        permissions: Arc<PermissionStringCache>,
        store: Arc<dyn InventoryStore>,
        max_page_size: u32,
    ) -> Self {
        Self {
            permissions,
            resolver: PermissionScopeResolver::new(),
            query_builder: SearchQueryBuilder::new(),
            store,
            max_page_size,
        }
    }

    pub fn with_query_builder(mut self, query_builder: SearchQueryBuilder) -> Self {
        self.query_builder = query_builder;
        self
    }

    /// Search the inventory visible to `user_id` under `right_name`.
    ///
    /// The scope is resolved once and shared by the count and select queries.
    /// Either query failing fails the whole call.
    #[tracing::instrument(
        name = "inventory_search",
        skip(self, filters, page),
        fields(total = tracing::field::Empty, rows = tracing::field::Empty)
    )]
    pub async fn search(
        &self,
        user_id: Uuid,
        right_name: &str,
        filters: &SearchFilters,
        page: &PageRequest,
    ) -> Result<Page<InventoryRecord>> {
        let start = Instant::now();
        let result = self.search_inner(user_id, right_name, filters, page).await;

        let status = match &result {
            Ok(_) => "success",
            Err(e) => e.code(),
        };
        metrics::INVENTORY_SEARCHES_TOTAL
            .with_label_values(&[status])
            .inc();
        metrics::INVENTORY_SEARCH_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        result
    }

    async fn search_inner(
        &self,
        user_id: Uuid,
        right_name: &str,
        filters: &SearchFilters,
        page: &PageRequest,
    ) -> Result<Page<InventoryRecord>> {
        self.validate(user_id, right_name, page)?;

        let strings = self.permissions.get(user_id).await?;
        let scope = self
            .resolver
            .resolve(right_name, strings.iter(), filters.facility_id);
        tracing::debug!(
            facilities = scope.facility_ids.len(),
            programs = scope.program_ids.len(),
            "Resolved search scope"
        );

        // Reject bad sort keys before touching the store.
        let select = self.query_builder.build_select(&scope, filters, page)?;
        let count = self.query_builder.build_count(&scope, filters);

        let total = self.store.count(&count).await?;
        let rows = self.store.select(&select).await?;

        let span = tracing::Span::current();
        span.record("total", total);
        span.record("rows", rows.len());

        Ok(Page::new(rows, page, total))
    }

    fn validate(&self, user_id: Uuid, right_name: &str, page: &PageRequest) -> Result<()> {
        if user_id.is_nil() {
            return Err(Error::Validation("User id is required".to_string()));
        }
        if right_name.trim().is_empty() {
            return Err(Error::Validation("Right name is required".to_string()));
        }
        page.validate()?;
        if page.size > self.max_page_size {
            return Err(Error::Validation(format!(
                "Page size {} exceeds the maximum of {}",
                page.size, self.max_page_size
            )));
        }
        Ok(())
    }
}
