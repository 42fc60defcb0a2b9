//! PostgreSQL-backed inventory store

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    db::search::{BindValue, CountQuery, SelectQuery},
    db::traits::InventoryStore,
    models::{CatalogRecord, FunctionalStatus, InventoryRecord},
    Error, Result,
};

#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn count(&self, query: &CountQuery) -> Result<i64> {
        let (sql, bind_values) = query.build_sql();
        tracing::trace!(sql = %sql, "Executing inventory count");

        let mut query_builder = sqlx::query_scalar::<_, i64>(&sql);
        for value in bind_values {
            query_builder = match value {
                BindValue::Text(v) => query_builder.bind(v),
                BindValue::UuidArray(vs) => query_builder.bind(vs),
            };
        }

        let total = query_builder
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(total)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<InventoryRecord>> {
        let (sql, bind_values) = query.build_sql();
        tracing::trace!(sql = %sql, "Executing inventory select");

        let mut query_builder = sqlx::query(&sql);
        for value in bind_values {
            query_builder = match value {
                BindValue::Text(v) => query_builder.bind(v),
                BindValue::UuidArray(vs) => query_builder.bind(vs),
            };
        }

        let rows = query_builder
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &PgRow) -> Result<InventoryRecord> {
    let status: String = row.try_get("functional_status")?;
    let functional_status = status.parse::<FunctionalStatus>().map_err(|_| {
        Error::Internal(format!("Stored functional status is not recognised: {status}"))
    })?;

    Ok(InventoryRecord {
        id: row.try_get("id")?,
        facility_id: row.try_get("facility_id")?,
        program_id: row.try_get("program_id")?,
        functional_status,
        equipment_tracking_id: row.try_get("equipment_tracking_id")?,
        reference_name: row.try_get("reference_name")?,
        year_of_installation: row.try_get("year_of_installation")?,
        modified_date: row.try_get("modified_date")?,
        catalog_item: CatalogRecord {
            id: row.try_get("catalog_id")?,
            equipment_type: row.try_get("catalog_type")?,
            model: row.try_get("catalog_model")?,
            manufacturer: row.try_get("catalog_manufacturer")?,
            energy_source: row.try_get("catalog_energy_source")?,
            equipment_code: row.try_get("catalog_equipment_code")?,
        },
    })
}
