//! Error types for the inventory service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::permissions::PermissionSourceError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The permission-string source could not be consulted.
    #[error("Permission retrieval failed: {0}")]
    Retrieval(#[from] PermissionSourceError),

    /// Caller input rejected before any I/O happened.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Count or select query failed against the store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Stable machine-readable code, also used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Retrieval(_) => "permission_retrieval",
            Error::Validation(_) => "validation",
            Error::Database(_) | Error::Migration(_) => "store",
            Error::Internal(_) | Error::Other(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Retrieval(_) => StatusCode::BAD_GATEWAY,
            Error::Database(_) | Error::Migration(_) | Error::Internal(_) | Error::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::Validation(_) => self.to_string(),
            Error::Retrieval(e) => {
                tracing::warn!(error = %e, "Permission retrieval failed");
                "Unable to retrieve user permissions".to_string()
            }
            Error::Database(_)
            | Error::Migration(_)
            | Error::Internal(_)
            | Error::Other(_) => {
                tracing::error!("Internal error: {}", self);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": self.code(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = Error::Validation("page size must be positive".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn retrieval_maps_to_bad_gateway() {
        let err = Error::from(PermissionSourceError::UnexpectedStatus(503));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "permission_retrieval");
    }
}
