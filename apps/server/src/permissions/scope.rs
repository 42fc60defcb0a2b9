//! Resolution of a permission-string set into the facility/program scope of one right.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use super::string::PermissionString;

/// Facilities and programs a user may act on for a single right.
///
/// The two sets are accumulated independently, so a user holding `(F1, P1)`
/// and `(F2, P2)` resolves to `{F1, F2} x {P1, P2}` once both are applied as
/// separate filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeResult {
    pub facility_ids: HashSet<Uuid>,
    pub program_ids: HashSet<Uuid>,
}

impl ScopeResult {
    /// No facility and no program: the user holds the right nowhere.
    pub fn is_empty(&self) -> bool {
        self.facility_ids.is_empty() && self.program_ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionScopeResolver;

impl PermissionScopeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Collect the scope of `right_name` from `strings`.
    ///
    /// With `facility_filter` set, grants pinned to another facility are
    /// dropped; facility-wildcard grants always pass.
    pub fn resolve<'a, I>(
        &self,
        right_name: &str,
        strings: I,
        facility_filter: Option<Uuid>,
    ) -> ScopeResult
    where
        I: IntoIterator<Item = &'a PermissionString>,
    {
        let mut scope = ScopeResult::default();

        for grant in strings {
            if !grant.grants(right_name) {
                continue;
            }

            if let (Some(filter), Some(facility)) = (facility_filter, grant.facility_id()) {
                if facility != filter {
                    continue;
                }
            }

            if let Some(facility) = grant.facility_id() {
                scope.facility_ids.insert(facility);
            }
            if let Some(program) = grant.program_id() {
                scope.program_ids.insert(program);
            }
        }

        scope
    }
}
