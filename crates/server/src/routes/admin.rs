//! Admin route handlers.
//!
//! Authorization is a bearer token checked by [`RequireAdmin`]; the
//! console behind it is trusted for everything else.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use velvet_core::{Order, OrderId, OrderStatus};

use crate::error::Result;
use crate::middleware::{Json, RequireAdmin};
use crate::routes::orders::OrderListResponse;
use crate::state::AppState;

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct SetStatusForm {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Status update response.
#[derive(Debug, Serialize)]
pub struct SetStatusResponse {
    pub success: bool,
    pub order: Order,
}

/// Every order in the store, newest first.
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<OrderListResponse>> {
    let orders = state.orders().list_all().await?;
    Ok(Json(OrderListResponse {
        success: true,
        orders,
    }))
}

/// Move an order to a new status, within the lifecycle rules.
#[instrument(skip(state, _admin))]
pub async fn set_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(form): Json<SetStatusForm>,
) -> Result<Json<SetStatusResponse>> {
    let order = state.orders().set_status(form.order_id, form.status).await?;
    Ok(Json(SetStatusResponse {
        success: true,
        order,
    }))
}
