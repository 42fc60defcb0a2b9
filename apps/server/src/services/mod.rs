//! Service layer - business logic

pub mod search;

pub use search::InventorySearchService;
