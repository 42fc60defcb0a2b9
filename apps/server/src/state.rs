//! Shared application state
//!
//! Everything long-lived is constructed once here and injected into handlers:
//! the permission-string cache, the inventory store and the search service.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::{
    config::{Config, StoreKind},
    db::{InventoryStore, MemoryInventoryStore, PostgresInventoryStore, SearchQueryBuilder},
    permissions::{HttpPermissionSource, PermissionStringCache, PermissionStringSource},
    services::InventorySearchService,
    Error, Result,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub permissions: Arc<PermissionStringCache>,
    pub search_service: Arc<InventorySearchService>,
}

impl AppState {
    /// Build state from configuration: connect the configured store and the
    /// HTTP permission source.
    pub async fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn InventoryStore> = match config.store {
            StoreKind::Postgres => Arc::new(connect_postgres(&config).await?),
            StoreKind::Memory => {
                tracing::warn!("Using in-memory inventory store; data is not persisted");
                Arc::new(MemoryInventoryStore::new())
            }
        };

        let source = HttpPermissionSource::new(&config.permissions)
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(Self::with_parts(config, Arc::new(source), store))
    }

    /// Assemble state from already-built collaborators.
    pub fn with_parts(
        config: Config,
        source: Arc<dyn PermissionStringSource>,
        store: Arc<dyn InventoryStore>,
    ) -> Self {
        let permissions = Arc::new(PermissionStringCache::new(source));
        let query_builder =
            SearchQueryBuilder::new().with_scope_required(config.search.scope_required);
        let search_service = Arc::new(
            InventorySearchService::new(
                Arc::clone(&permissions),
                store,
                config.search.max_page_size,
            )
            .with_query_builder(query_builder),
        );

        Self {
            config: Arc::new(config),
            permissions,
            search_service,
        }
    }
}

async fn connect_postgres(config: &Config) -> Result<PostgresInventoryStore> {
    let db = &config.database;
    let statement_timeout_ms = db.statement_timeout_seconds * 1000;

    let pool = PgPoolOptions::new()
        .min_connections(db.pool_min_size)
        .max_connections(db.pool_max_size)
        .acquire_timeout(Duration::from_secs(db.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = {statement_timeout_ms}"))
                    .execute(conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&db.url)
        .await
        .map_err(Error::Database)?;

    if db.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    tracing::info!(
        pool_max_size = db.pool_max_size,
        "Connected to PostgreSQL inventory store"
    );
    Ok(PostgresInventoryStore::new(pool))
}
