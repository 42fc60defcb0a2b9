//! Custom Axum extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::Error;

/// Header carrying the authenticated user's id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf the request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| Error::Validation(format!("Missing {USER_ID_HEADER} header")))?
            .to_str()
            .map_err(|_| Error::Validation(format!("{USER_ID_HEADER} header is not valid UTF-8")))?;

        let user_id = Uuid::parse_str(raw.trim())
            .map_err(|e| Error::Validation(format!("Invalid {USER_ID_HEADER} header: {e}")))?;

        Ok(CurrentUser(user_id))
    }
}
