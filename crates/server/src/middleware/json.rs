//! JSON body extractor that speaks the application's error envelope.
//!
//! Axum's own `Json` rejection answers a malformed body with a
//! plain-text 422. Every other failure on this surface is the JSON
//! envelope produced by [`AppError`], so handlers take request bodies
//! through this wrapper instead: a body that does not deserialize (wrong
//! shape, negative quantity, missing field) becomes a validation error.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Drop-in replacement for [`axum::Json`] on both sides of a handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
