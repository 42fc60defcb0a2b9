//! Mapping from logical sort properties to physical columns.

use std::cmp::Ordering;

use crate::models::{Direction, InventoryRecord, SortOrder};

/// Sortable properties. Everything resolves against the inventory table except
/// `type`, which lives on the joined catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    FacilityId,
    ProgramId,
    FunctionalStatus,
    EquipmentTrackingId,
    ReferenceName,
    YearOfInstallation,
    ModifiedDate,
    CatalogType,
}

impl SortKey {
    pub fn from_property(property: &str) -> crate::Result<Self> {
        let key = match property {
            "id" => Self::Id,
            "facilityId" => Self::FacilityId,
            "programId" => Self::ProgramId,
            "functionalStatus" => Self::FunctionalStatus,
            "equipmentTrackingId" => Self::EquipmentTrackingId,
            "referenceName" => Self::ReferenceName,
            "yearOfInstallation" => Self::YearOfInstallation,
            "modifiedDate" => Self::ModifiedDate,
            "type" => Self::CatalogType,
            other => {
                return Err(crate::Error::Validation(format!(
                    "Unsupported sort property: {other}"
                )))
            }
        };
        Ok(key)
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "i.id",
            Self::FacilityId => "i.facility_id",
            Self::ProgramId => "i.program_id",
            Self::FunctionalStatus => "i.functional_status",
            Self::EquipmentTrackingId => "i.equipment_tracking_id",
            Self::ReferenceName => "i.reference_name",
            Self::YearOfInstallation => "i.year_of_installation",
            Self::ModifiedDate => "i.modified_date",
            Self::CatalogType => "c.type",
        }
    }

    /// In-memory comparison following PostgreSQL's ascending order
    /// (NULLs sort after every value).
    pub fn compare(&self, a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::FacilityId => a.facility_id.cmp(&b.facility_id),
            Self::ProgramId => a.program_id.cmp(&b.program_id),
            Self::FunctionalStatus => a
                .functional_status
                .as_str()
                .cmp(b.functional_status.as_str()),
            Self::EquipmentTrackingId => {
                nulls_last(&a.equipment_tracking_id, &b.equipment_tracking_id)
            }
            Self::ReferenceName => nulls_last(&a.reference_name, &b.reference_name),
            Self::YearOfInstallation => {
                nulls_last(&a.year_of_installation, &b.year_of_installation)
            }
            Self::ModifiedDate => nulls_last(&a.modified_date, &b.modified_date),
            Self::CatalogType => a
                .catalog_item
                .equipment_type
                .cmp(&b.catalog_item.equipment_type),
        }
    }
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSort {
    pub key: SortKey,
    pub direction: Direction,
}

impl ResolvedSort {
    pub fn compare(&self, a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
        let ord = self.key.compare(a, b);
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

/// Resolve caller sort instructions, keeping their order. Unknown properties fail.
pub fn resolve_sort(orders: &[SortOrder]) -> crate::Result<Vec<ResolvedSort>> {
    orders
        .iter()
        .map(|o| {
            Ok(ResolvedSort {
                key: SortKey::from_property(&o.property)?,
                direction: o.direction,
            })
        })
        .collect()
}
