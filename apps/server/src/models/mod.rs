//! Domain models for the inventory search subsystem

pub mod inventory;
pub mod page;

pub use inventory::{CatalogRecord, FunctionalStatus, InventoryRecord, SearchFilters};
pub use page::{Direction, Page, PageRequest, SortOrder};
