//! Core traits for inventory storage backends

use async_trait::async_trait;

use crate::{
    db::search::{CountQuery, SelectQuery},
    models::InventoryRecord,
    Result,
};

/// Read-only execution of inventory search queries.
///
/// Any backend that can evaluate the predicate model (PostgreSQL, in-memory,
/// ...) can implement this trait. Count and select are separate calls and are
/// not wrapped in a common transaction.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Number of inventory rows matching `query`.
    async fn count(&self, query: &CountQuery) -> Result<i64>;

    /// The page of rows described by `query`, joined with their catalog entries.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<InventoryRecord>>;
}
