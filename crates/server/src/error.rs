//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures dependency failures
//! to Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Recoverable errors carry structure (shortfall
//! amounts, offending statuses) in the JSON body, never a bare boolean.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use velvet_core::{CartError, CouponRejection, Money, OrderError, OrderStatus};

use crate::catalog::CatalogError;
use crate::payment::PaymentError;
use crate::store::StorageError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input shape: empty size, zero delta, malformed body.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown product, order, or coupon.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Checkout attempted with no cart lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Coupon rejected; carries the shortfall for "add $X more" messaging.
    #[error("Coupon not eligible")]
    CouponIneligible { shortfall: Option<Money> },

    /// Illegal order status change.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Payment provider confirmation mismatch.
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),

    /// Storage or provider failure. The core never retries these; every
    /// operation is safe for the caller to retry.
    #[error("Dependency error: {0}")]
    Dependency(String),

    /// Missing or wrong credentials on an authenticated route.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CouponRejection> for AppError {
    fn from(err: CouponRejection) -> Self {
        match err {
            CouponRejection::InvalidCode => Self::NotFound("coupon code".to_owned()),
            CouponRejection::BelowMinimum { shortfall } => Self::CouponIneligible {
                shortfall: Some(shortfall),
            },
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyCart => Self::EmptyCart,
            OrderError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Dependency(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Dependency(err.to_string())
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        Self::Dependency(err.to_string())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    shortfall: Option<Money>,
}

impl AppError {
    const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::EmptyCart => "empty_cart",
            Self::CouponIneligible { .. } => "coupon_ineligible",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::PaymentVerification(_) => "payment_verification",
            Self::Dependency(_) => "dependency",
            Self::Unauthorized(_) => "unauthorized",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture dependency failures to Sentry
        if matches!(self, Self::Dependency(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) | Self::EmptyCart => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CouponIneligible { .. } | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::PaymentVerification(_) => StatusCode::PAYMENT_REQUIRED,
            Self::Dependency(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        };

        // Don't expose dependency details to clients
        let message = match &self {
            Self::Dependency(_) => "External service error".to_owned(),
            Self::CouponIneligible {
                shortfall: Some(shortfall),
            } => {
                format!("Add products worth {} more to apply this coupon", shortfall.display())
            }
            _ => self.to_string(),
        };

        let shortfall = match &self {
            Self::CouponIneligible { shortfall } => *shortfall,
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            error: self.code(),
            message,
            shortfall,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::NotFound("order".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::CouponIneligible {
                shortfall: Some(Money::from_major(300))
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::PaymentVerification("mismatch".to_owned())),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            get_status(AppError::Dependency("storage".to_owned())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn coupon_rejection_carries_shortfall_through() {
        let err: AppError = CouponRejection::BelowMinimum {
            shortfall: Money::from_major(300),
        }
        .into();
        match err {
            AppError::CouponIneligible { shortfall } => {
                assert_eq!(shortfall, Some(Money::from_major(300)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dependency_details_are_not_exposed() {
        let response = AppError::Dependency("postgres://secret".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
