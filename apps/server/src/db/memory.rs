//! In-memory inventory store.
//!
//! Evaluates the same predicate and sort model as the SQL renderer, against
//! records held in memory. Used for local runs without a database and in tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    db::search::{query_builder::matches_all, CountQuery, SelectQuery, SortKey},
    db::traits::InventoryStore,
    models::InventoryRecord,
    Result,
};

#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    records: RwLock<Vec<InventoryRecord>>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<InventoryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn insert(&self, record: InventoryRecord) {
        self.records.write().await.push(record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn count(&self, query: &CountQuery) -> Result<i64> {
        let records = self.records.read().await;
        let total = records
            .iter()
            .filter(|r| matches_all(&query.predicates, r))
            .count();
        Ok(total as i64)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<InventoryRecord>> {
        let records = self.records.read().await;
        let mut matched: Vec<&InventoryRecord> = records
            .iter()
            .filter(|r| matches_all(&query.predicates, r))
            .collect();

        let has_id_key = query.sort.iter().any(|s| s.key == SortKey::Id);
        matched.sort_by(|a, b| {
            let ord = query
                .sort
                .iter()
                .map(|s| s.compare(a, b))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal);
            if ord.is_eq() && !has_id_key {
                a.id.cmp(&b.id)
            } else {
                ord
            }
        });

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
