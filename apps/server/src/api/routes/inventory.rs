//! Inventory API Routes

use crate::api::handlers::search;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn inventory_routes() -> Router<AppState> {
    Router::new().route(
        "/cceInventoryItems/search",
        get(search::search_inventory),
    )
}
