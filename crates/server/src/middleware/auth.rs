//! Authentication extractors.
//!
//! Authentication itself is an external collaborator: the gateway in
//! front of this service authenticates the customer and forwards the
//! identity in the `x-user-id` header, which the core trusts. Admin
//! routes require the configured bearer token instead.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use secrecy::ExposeSecret;

use velvet_core::UserId;

use crate::error::AppError;
use crate::state::AppState;

const USER_HEADER: &str = "x-user-id";

/// Extractor that requires an authenticated user identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user_id): RequireUser) -> impl IntoResponse {
///     format!("cart for {user_id}")
/// }
/// ```
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing user identity".to_owned()))?;
        Ok(Self(UserId::new(user_id)))
    }
}

/// Extractor that requires the admin bearer token.
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing admin token".to_owned()))?;
        if token != state.admin_token().expose_secret() {
            return Err(AppError::Unauthorized("invalid admin token".to_owned()));
        }
        Ok(Self)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
