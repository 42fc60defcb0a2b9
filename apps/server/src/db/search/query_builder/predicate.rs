//! Store-independent predicate model.
//!
//! Each clause renders to SQL for the relational store and can also be
//! evaluated directly against an [`InventoryRecord`].

use uuid::Uuid;

use super::bind::{push_text, push_uuid_array};
use super::BindValue;
use crate::models::{FunctionalStatus, InventoryRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `facility_id IN (...)`; an empty list matches nothing.
    FacilityIn(Vec<Uuid>),
    /// `program_id IN (...)`; an empty list matches nothing.
    ProgramIn(Vec<Uuid>),
    StatusEquals(FunctionalStatus),
}

impl Predicate {
    pub(super) fn build_sql(&self, bind_params: &mut Vec<BindValue>) -> String {
        match self {
            Predicate::FacilityIn(ids) => {
                let idx = push_uuid_array(bind_params, ids.clone());
                format!("i.facility_id = ANY(${})", idx)
            }
            Predicate::ProgramIn(ids) => {
                let idx = push_uuid_array(bind_params, ids.clone());
                format!("i.program_id = ANY(${})", idx)
            }
            Predicate::StatusEquals(status) => {
                let idx = push_text(bind_params, status.as_str().to_string());
                format!("i.functional_status = ${}", idx)
            }
        }
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        match self {
            Predicate::FacilityIn(ids) => ids.contains(&record.facility_id),
            Predicate::ProgramIn(ids) => ids.contains(&record.program_id),
            Predicate::StatusEquals(status) => record.functional_status == *status,
        }
    }
}

/// AND of all clauses; an empty slice matches everything.
pub fn matches_all(predicates: &[Predicate], record: &InventoryRecord) -> bool {
    predicates.iter().all(|p| p.matches(record))
}
