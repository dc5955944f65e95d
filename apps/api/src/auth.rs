//! Identity forwarded by the upstream authentication provider.
//!
//! The service never authenticates anyone itself: a request either carries a
//! user id header set by the provider, or it is treated as anonymous and rejected.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use crate::errors::AppError;
use crate::storage::validate_key;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, USER_ID_HEADER).ok_or(AppError::Unauthorized)?;
        validate_key(&id).map_err(|_| AppError::Unauthorized)?;
        Ok(AuthUser {
            id,
            email: header(parts, USER_EMAIL_HEADER),
            name: header(parts, USER_NAME_HEADER),
        })
    }
}
