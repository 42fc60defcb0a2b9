//! SQL query builder for permission-scoped inventory searches.
//!
//! Builds two query shapes from a resolved scope and caller filters:
//! - a count query (predicates only, never ordered or paged)
//! - a select query (predicates, inner join to the catalog, ordering, paging)
//!
//! Predicates are kept as a tagged list so they can be rendered to SQL or
//! evaluated in memory.

use uuid::Uuid;

use crate::models::{PageRequest, SearchFilters};
use crate::permissions::ScopeResult;

mod bind;
mod predicate;
mod sort;

pub use predicate::{matches_all, Predicate};
pub use sort::{resolve_sort, ResolvedSort, SortKey};

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    UuidArray(Vec<Uuid>),
}

const FROM_JOINED: &str =
    "FROM cce_inventory_items i INNER JOIN cce_catalog_items c ON c.id = i.catalog_item_id";

const SELECT_COLUMNS: &str = "SELECT i.id, i.facility_id, i.program_id, i.functional_status, \
     i.equipment_tracking_id, i.reference_name, i.year_of_installation, i.modified_date, \
     c.id AS catalog_id, c.type AS catalog_type, c.model AS catalog_model, \
     c.manufacturer AS catalog_manufacturer, c.energy_source AS catalog_energy_source, \
     c.equipment_code AS catalog_equipment_code";

/// Scalar count over the scoped, filtered inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery {
    pub predicates: Vec<Predicate>,
}

/// One page of scoped, filtered inventory joined with its catalog rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub predicates: Vec<Predicate>,
    pub sort: Vec<ResolvedSort>,
    pub offset: i64,
    pub limit: i64,
}

impl CountQuery {
    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut sql = format!("SELECT COUNT(*) {FROM_JOINED}");
        let mut bind_params = Vec::new();
        push_where(&mut sql, &self.predicates, &mut bind_params);
        (sql, bind_params)
    }
}

impl SelectQuery {
    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut sql = format!("{SELECT_COLUMNS} {FROM_JOINED}");
        let mut bind_params = Vec::new();
        push_where(&mut sql, &self.predicates, &mut bind_params);
        self.push_order_by(&mut sql);
        sql.push_str(&format!(" LIMIT {} OFFSET {}", self.limit, self.offset));
        (sql, bind_params)
    }

    fn push_order_by(&self, sql: &mut String) {
        let mut order_by: Vec<String> = self
            .sort
            .iter()
            .map(|s| format!("{} {}", s.key.column(), s.direction.as_sql()))
            .collect();

        // Deterministic paging: the id tiebreak goes after every caller key.
        if !self.sort.iter().any(|s| s.key == SortKey::Id) {
            order_by.push("i.id ASC".to_string());
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by.join(", "));
    }
}

fn push_where(sql: &mut String, predicates: &[Predicate], bind_params: &mut Vec<BindValue>) {
    let clauses: Vec<String> = predicates
        .iter()
        .map(|p| p.build_sql(bind_params))
        .collect();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
}

/// Turns an authorization scope plus caller filters into count/select queries.
#[derive(Debug, Clone, Copy)]
pub struct SearchQueryBuilder {
    scope_required: bool,
}

impl Default for SearchQueryBuilder {
    fn default() -> Self {
        Self {
            scope_required: true,
        }
    }
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether holding the right somewhere is required to see anything.
    ///
    /// When required, an entirely empty scope matches no rows; otherwise it
    /// imposes no constraint.
    pub fn with_scope_required(mut self, required: bool) -> Self {
        self.scope_required = required;
        self
    }

    pub fn predicates(&self, scope: &ScopeResult, filters: &SearchFilters) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if !scope.facility_ids.is_empty() {
            predicates.push(Predicate::FacilityIn(sorted(&scope.facility_ids)));
        }
        if !scope.program_ids.is_empty() {
            predicates.push(Predicate::ProgramIn(sorted(&scope.program_ids)));
        }
        if self.scope_required && scope.is_empty() {
            predicates.push(Predicate::FacilityIn(Vec::new()));
        }
        if let Some(status) = filters.functional_status {
            predicates.push(Predicate::StatusEquals(status));
        }

        predicates
    }

    pub fn build_count(&self, scope: &ScopeResult, filters: &SearchFilters) -> CountQuery {
        CountQuery {
            predicates: self.predicates(scope, filters),
        }
    }

    pub fn build_select(
        &self,
        scope: &ScopeResult,
        filters: &SearchFilters,
        page: &PageRequest,
    ) -> crate::Result<SelectQuery> {
        Ok(SelectQuery {
            predicates: self.predicates(scope, filters),
            sort: resolve_sort(&page.sort)?,
            offset: page.offset(),
            limit: page.limit(),
        })
    }
}

fn sorted(ids: &std::collections::HashSet<Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = ids.iter().copied().collect();
    out.sort();
    out
}
