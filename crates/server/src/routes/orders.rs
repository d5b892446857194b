//! Order route handlers for customers.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use velvet_core::{Order, OrderId, PaymentMethod, ShippingAddress};

use crate::error::Result;
use crate::middleware::{Json, RequireUser};
use crate::state::AppState;

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Place order response. `redirect_url` is present for external payment
/// methods; the client sends the customer there to pay.
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Payment confirmation form data, from the webhook or redirect-return.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub order_id: OrderId,
    pub session_id: String,
}

/// Payment confirmation response. `paid` is false when the provider
/// reports the session unsettled; the order stays placed for retry.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub paid: bool,
    pub order: Order,
}

/// Order list response.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}

/// Snapshot the current cart into an order.
#[instrument(skip(state, form))]
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(form): Json<PlaceOrderForm>,
) -> Result<Json<PlaceOrderResponse>> {
    let placed = state
        .orders()
        .place(&user_id, form.address, form.payment_method)
        .await?;
    Ok(Json(PlaceOrderResponse {
        success: true,
        order: placed.order,
        redirect_url: placed.redirect_url,
    }))
}

/// Confirm an external payment. Safe to re-deliver.
#[instrument(skip(state))]
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(form): Json<VerifyForm>,
) -> Result<Json<VerifyResponse>> {
    let order = state
        .orders()
        .confirm_payment(&user_id, form.order_id, &form.session_id)
        .await?;
    Ok(Json(VerifyResponse {
        success: true,
        paid: order.paid,
        order,
    }))
}

/// The caller's orders, newest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<OrderListResponse>> {
    let orders = state.orders().list_for_user(&user_id).await?;
    Ok(Json(OrderListResponse {
        success: true,
        orders,
    }))
}
