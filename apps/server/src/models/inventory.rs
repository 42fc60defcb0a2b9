//! Inventory and catalog records as read by the search subsystem.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Working state of a piece of cold-chain equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionalStatus {
    Functioning,
    AwaitingRepair,
    Unserviceable,
}

impl FunctionalStatus {
    pub const ALL: [FunctionalStatus; 3] = [
        FunctionalStatus::Functioning,
        FunctionalStatus::AwaitingRepair,
        FunctionalStatus::Unserviceable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionalStatus::Functioning => "FUNCTIONING",
            FunctionalStatus::AwaitingRepair => "AWAITING_REPAIR",
            FunctionalStatus::Unserviceable => "UNSERVICEABLE",
        }
    }
}

impl fmt::Display for FunctionalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionalStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Validation(format!("Unknown functional status: {s}")))
    }
}

/// Catalog entry describing an equipment model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub model: String,
    pub manufacturer: String,
    pub energy_source: Option<String>,
    pub equipment_code: Option<String>,
}

/// One physical piece of equipment at a facility, joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub program_id: Uuid,
    pub functional_status: FunctionalStatus,
    pub equipment_tracking_id: Option<String>,
    pub reference_name: Option<String>,
    pub year_of_installation: Option<i32>,
    pub modified_date: Option<DateTime<Utc>>,
    pub catalog_item: CatalogRecord,
}

/// Caller-supplied search filters. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub facility_id: Option<Uuid>,
    pub functional_status: Option<FunctionalStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "awaiting_repair".parse::<FunctionalStatus>().unwrap(),
            FunctionalStatus::AwaitingRepair
        );
        assert!("BROKEN".parse::<FunctionalStatus>().is_err());
    }

    #[test]
    fn catalog_type_serializes_as_type() {
        let catalog = CatalogRecord {
            id: Uuid::nil(),
            equipment_type: "Freezer".into(),
            model: "MK 304".into(),
            manufacturer: "Vestfrost".into(),
            energy_source: None,
            equipment_code: None,
        };
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["type"], "Freezer");
        assert!(json.get("equipmentType").is_none());
    }
}
