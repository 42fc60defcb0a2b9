use chrono::{DateTime, Utc};
use cce_inventory::models::{CatalogRecord, FunctionalStatus, InventoryRecord};
use uuid::Uuid;

pub const VIEW_RIGHT: &str = "CCE_INVENTORY_VIEW";

/// `right|facility|program` wire string.
pub fn grant(right: &str, facility: Uuid, program: Uuid) -> String {
    format!("{right}|{facility}|{program}")
}

/// `right|facility` wire string.
pub fn facility_grant(right: &str, facility: Uuid) -> String {
    format!("{right}|{facility}")
}

/// Builder for inventory records
pub struct InventoryRecordBuilder {
    record: InventoryRecord,
}

impl InventoryRecordBuilder {
    pub fn new(facility_id: Uuid, program_id: Uuid) -> Self {
        Self {
            record: InventoryRecord {
                id: Uuid::new_v4(),
                facility_id,
                program_id,
                functional_status: FunctionalStatus::Functioning,
                equipment_tracking_id: None,
                reference_name: None,
                year_of_installation: None,
                modified_date: None,
                catalog_item: CatalogRecord {
                    id: Uuid::new_v4(),
                    equipment_type: "Refrigerator".to_string(),
                    model: "RCW 50 EG".to_string(),
                    manufacturer: "Vestfrost".to_string(),
                    energy_source: Some("ELECTRIC".to_string()),
                    equipment_code: None,
                },
            },
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.record.id = id;
        self
    }

    pub fn status(mut self, status: FunctionalStatus) -> Self {
        self.record.functional_status = status;
        self
    }

    pub fn reference_name(mut self, name: impl Into<String>) -> Self {
        self.record.reference_name = Some(name.into());
        self
    }

    pub fn equipment_type(mut self, equipment_type: impl Into<String>) -> Self {
        self.record.catalog_item.equipment_type = equipment_type.into();
        self
    }

    pub fn year_of_installation(mut self, year: i32) -> Self {
        self.record.year_of_installation = Some(year);
        self
    }

    pub fn modified_date(mut self, date: DateTime<Utc>) -> Self {
        self.record.modified_date = Some(date);
        self
    }

    pub fn build(self) -> InventoryRecord {
        self.record
    }
}
