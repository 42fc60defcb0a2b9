//! Database layer - query construction and inventory stores

pub mod memory;
pub mod search;
pub mod store;
pub mod traits;

pub use memory::MemoryInventoryStore;
pub use search::SearchQueryBuilder;
pub use store::PostgresInventoryStore;
pub use traits::InventoryStore;
