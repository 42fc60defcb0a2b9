//! In-process stand-in for the authorization service's permission-string API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context as _;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use uuid::Uuid;

#[derive(Clone)]
struct UserPermissions {
    body: String,
    etag: String,
}

#[derive(Default)]
struct ServerState {
    users: Mutex<HashMap<Uuid, UserPermissions>>,
    versions: AtomicUsize,
    hits: AtomicUsize,
    conditional_hits: AtomicUsize,
    not_modified: AtomicUsize,
    failing: AtomicBool,
    delay_ms: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

pub struct FakePermissionServer {
    pub base_url: String,
    state: Arc<ServerState>,
    handle: tokio::task::JoinHandle<()>,
}

impl FakePermissionServer {
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(ServerState::default());
        let router = Router::new()
            .route("/api/users/:user_id/permissionStrings", get(permission_strings))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind fake permission server")?;
        let addr = listener.local_addr().context("fake server address")?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}/api"),
            state,
            handle,
        })
    }

    /// Replace the permission strings of `user_id`; the entity tag changes.
    pub fn set_permissions(&self, user_id: Uuid, strings: &[String]) {
        let body = serde_json::to_string(strings).unwrap_or_else(|_| "[]".to_string());
        self.set_raw_body(user_id, body);
    }

    /// Serve `body` verbatim for `user_id`.
    pub fn set_raw_body(&self, user_id: Uuid, body: impl Into<String>) {
        let version = self.state.versions.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.users.lock().unwrap().insert(
            user_id,
            UserPermissions {
                body: body.into(),
                etag: format!("\"v{version}\""),
            },
        );
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    /// Requests received so far.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Requests that carried `If-None-Match`.
    pub fn conditional_hits(&self) -> usize {
        self.state.conditional_hits.load(Ordering::SeqCst)
    }

    /// Requests answered with 304.
    pub fn not_modified(&self) -> usize {
        self.state.not_modified.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }
}

impl Drop for FakePermissionServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn permission_strings(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;
    }

    if state.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    if if_none_match.is_some() {
        state.conditional_hits.fetch_add(1, Ordering::SeqCst);
    }

    let current = state.users.lock().unwrap().get(&user_id).cloned();
    let Some(current) = current else {
        return (StatusCode::OK, [(header::ETAG, "\"v0\"")], "[]").into_response();
    };

    if if_none_match.as_deref() == Some(current.etag.as_str()) {
        state.not_modified.fetch_add(1, Ordering::SeqCst);
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, current.etag)]).into_response();
    }

    (
        StatusCode::OK,
        [
            (header::ETAG, current.etag),
            (header::CONTENT_TYPE, "application/json".to_string()),
        ],
        current.body,
    )
        .into_response()
}
