//! HTTP route handlers for the storefront backend.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Health check
//!
//! # Cart (authenticated user)
//! GET    /api/cart                  - Current cart, priced
//! POST   /api/cart/add              - Add item (quantity defaults to 1)
//! POST   /api/cart/update           - Set line quantity (0 deletes)
//! POST   /api/cart/remove           - Remove line
//! GET    /api/cart/price            - Pricing of the current cart
//! POST   /api/cart/coupon           - Apply coupon code
//! DELETE /api/cart/coupon           - Clear applied coupon
//!
//! # Orders (authenticated user)
//! POST   /api/orders/place          - Place order from current cart
//! POST   /api/orders/verify         - Confirm external payment
//! GET    /api/orders                - Caller's orders
//!
//! # Admin (bearer token)
//! GET    /api/admin/orders          - All orders
//! POST   /api/admin/orders/status   - Update order status
//! ```

pub mod admin;
pub mod cart;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/cart", get(cart::show))
        .route("/api/cart/add", post(cart::add))
        .route("/api/cart/update", post(cart::update))
        .route("/api/cart/remove", post(cart::remove))
        .route("/api/cart/price", get(cart::price))
        .route(
            "/api/cart/coupon",
            post(cart::apply_coupon).delete(cart::clear_coupon),
        )
        .route("/api/orders/place", post(orders::place))
        .route("/api/orders/verify", post(orders::verify))
        .route("/api/orders", get(orders::list))
        .route("/api/admin/orders", get(admin::list))
        .route("/api/admin/orders/status", post(admin::set_status))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
