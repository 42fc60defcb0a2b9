#![allow(dead_code)]

pub mod builders;
pub mod permission_server;

use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use cce_inventory::{
    api::{create_router, extractors::USER_ID_HEADER},
    config::StoreKind,
    db::MemoryInventoryStore,
    models::InventoryRecord,
    permissions::HttpPermissionSource,
    AppState, Config,
};
use serde_json::Value;
use tower::ServiceExt as _;
use uuid::Uuid;

pub use builders::*;
pub use permission_server::FakePermissionServer;

/// Router wired to an in-memory store and a fake permission server.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub permissions: FakePermissionServer,
}

impl TestApp {
    pub async fn new(records: Vec<InventoryRecord>) -> anyhow::Result<Self> {
        Self::new_with_config(records, |_| {}).await
    }

    pub async fn new_with_config(
        records: Vec<InventoryRecord>,
        configure: impl FnOnce(&mut Config),
    ) -> anyhow::Result<Self> {
        let permissions = FakePermissionServer::start().await?;

        let mut config = Config::default();
        config.store = StoreKind::Memory;
        config.permissions.base_url = permissions.base_url.clone();
        config.permissions.http_timeout_seconds = 5;
        configure(&mut config);

        let source = HttpPermissionSource::new(&config.permissions)
            .context("build permission source")?;
        let store = MemoryInventoryStore::with_records(records);
        let state = AppState::with_parts(config, Arc::new(source), Arc::new(store));
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            permissions,
        })
    }

    /// GET `path_and_query`, optionally as `user_id`; the body is parsed as JSON.
    pub async fn get(
        &self,
        path_and_query: &str,
        user_id: Option<Uuid>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let mut builder = Request::builder().method(Method::GET).uri(path_and_query);
        if let Some(user_id) = user_id {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        let request = builder.body(Body::empty()).context("build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok((status, headers, body))
    }
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "{context}: unexpected status");
}

/// Ids of `page.content`, in order.
pub fn content_ids(page: &Value) -> Vec<String> {
    page["content"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
