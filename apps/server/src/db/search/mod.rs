//! Search query construction

pub mod query_builder;

pub use query_builder::{
    BindValue, CountQuery, Predicate, ResolvedSort, SearchQueryBuilder, SelectQuery, SortKey,
};
