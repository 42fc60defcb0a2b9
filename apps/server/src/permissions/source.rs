//! Outbound permission-string source.
//!
//! The source is consulted with an optional entity tag; the HTTP details of
//! conditional requests stay in here and callers only see [`FetchResult`].

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use super::string::{PermissionString, PermissionStringError};
use crate::config::PermissionsConfig;

/// Outcome of a (conditional) fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// A full permission-string set, with the validator to send next time.
    Fresh {
        strings: HashSet<PermissionString>,
        etag: Option<String>,
    },
    /// The set identified by the supplied entity tag is still current.
    NotModified,
}

/// Failures talking to the permission source.
///
/// `Clone` so that callers waiting on an in-flight fetch can share the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionSourceError {
    #[error("permission source request failed: {0}")]
    Transport(String),

    #[error("permission source returned HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("permission source returned an unreadable body: {0}")]
    Body(String),

    #[error("permission source returned an invalid permission string: {0}")]
    Decode(#[from] PermissionStringError),

    #[error("permission source misconfigured: {0}")]
    Misconfigured(String),
}

#[async_trait]
pub trait PermissionStringSource: Send + Sync {
    /// Fetch the permission strings of `user_id`.
    ///
    /// With `etag` set the request is conditional and may answer
    /// [`FetchResult::NotModified`].
    async fn fetch(
        &self,
        user_id: Uuid,
        etag: Option<&str>,
    ) -> Result<FetchResult, PermissionSourceError>;
}

/// Permission source backed by the authorization service's REST API:
/// `GET {base_url}/users/{userId}/permissionStrings`.
#[derive(Clone)]
pub struct HttpPermissionSource {
    http: reqwest::Client,
    base_url: String,
    service_token: Option<String>,
}

impl HttpPermissionSource {
    pub fn new(config: &PermissionsConfig) -> Result<Self, PermissionSourceError> {
        if config.base_url.trim().is_empty() {
            return Err(PermissionSourceError::Misconfigured(
                "permissions.base_url is not set".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                PermissionSourceError::Misconfigured(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_token: config.service_token.clone(),
        })
    }

    fn url_for(&self, user_id: Uuid) -> String {
        format!("{}/users/{}/permissionStrings", self.base_url, user_id)
    }
}

#[async_trait]
impl PermissionStringSource for HttpPermissionSource {
    #[tracing::instrument(name = "permission_fetch", skip(self), fields(status = tracing::field::Empty))]
    async fn fetch(
        &self,
        user_id: Uuid,
        etag: Option<&str>,
    ) -> Result<FetchResult, PermissionSourceError> {
        let mut request = self.http.get(self.url_for(user_id));
        if let Some(tag) = etag {
            request = request.header(IF_NONE_MATCH, tag);
        }
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token);
        }

        let res = request
            .send()
            .await
            .map_err(|e| PermissionSourceError::Transport(e.to_string()))?;

        let status = res.status();
        tracing::Span::current().record("status", status.as_u16());

        // A 304 only makes sense as an answer to a conditional request.
        if status == StatusCode::NOT_MODIFIED && etag.is_some() {
            return Ok(FetchResult::NotModified);
        }
        if status != StatusCode::OK {
            return Err(PermissionSourceError::UnexpectedStatus(status.as_u16()));
        }

        let new_etag = res
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let raw: Vec<String> = res
            .json()
            .await
            .map_err(|e| PermissionSourceError::Body(e.to_string()))?;

        let strings = decode_all(&raw)?;
        tracing::debug!(
            %user_id,
            count = strings.len(),
            etag = new_etag.as_deref().unwrap_or(""),
            "Fetched permission strings"
        );

        Ok(FetchResult::Fresh {
            strings,
            etag: new_etag,
        })
    }
}

/// Decode a wire response; a single bad entry fails the whole response.
pub fn decode_all<S: AsRef<str>>(
    raw: &[S],
) -> Result<HashSet<PermissionString>, PermissionSourceError> {
    raw.iter()
        .map(|s| PermissionString::decode(s.as_ref()).map_err(PermissionSourceError::from))
        .collect()
}
