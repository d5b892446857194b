//! Cart route handlers.
//!
//! Every mutation returns the full priced cart so the client never has
//! to guess what the server-side coupon revalidation decided.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use velvet_core::{Coupon, ProductId, Quantity, ResolvedLine};

use crate::error::Result;
use crate::middleware::{Json, RequireUser};
use crate::services::cart::PricedCart;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    pub name: String,
    pub unit_price: String,
    pub line_total: String,
    pub image: Option<String>,
}

impl From<&ResolvedLine> for CartLineView {
    fn from(line: &ResolvedLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            size: line.size.clone(),
            quantity: line.quantity.get(),
            name: line.name.clone(),
            unit_price: line.unit_price.display(),
            line_total: line.line_total().display(),
            image: line.image.clone(),
        }
    }
}

/// Applied coupon display data.
#[derive(Debug, Clone, Serialize)]
pub struct CouponView {
    pub code: String,
    pub description: String,
}

impl From<&Coupon> for CouponView {
    fn from(coupon: &Coupon) -> Self {
        Self {
            code: coupon.code.clone(),
            description: coupon.description.clone(),
        }
    }
}

/// Pricing display data. Amounts are rounded to two decimals here, at
/// presentation time, never during accumulation.
#[derive(Debug, Clone, Serialize)]
pub struct PricingView {
    pub subtotal: String,
    pub discount: String,
    pub shipping_fee: String,
    pub total: String,
    pub item_count: u64,
}

impl From<&velvet_core::Pricing> for PricingView {
    fn from(pricing: &velvet_core::Pricing) -> Self {
        Self {
            subtotal: pricing.subtotal.display(),
            discount: pricing.discount.display(),
            shipping_fee: pricing.shipping_fee.display(),
            total: pricing.total.display(),
            item_count: pricing.item_count,
        }
    }
}

/// Cart response body.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub lines: Vec<CartLineView>,
    pub coupon: Option<CouponView>,
    pub pricing: PricingView,
}

impl From<PricedCart> for CartResponse {
    fn from(cart: PricedCart) -> Self {
        Self {
            success: true,
            lines: cart.lines.iter().map(CartLineView::from).collect(),
            coupon: cart.coupon.as_ref().map(CouponView::from),
            pricing: PricingView::from(&cart.pricing),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: Option<u32>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: ProductId,
    pub size: String,
}

/// Apply coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
}

/// Current cart, priced.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<CartResponse>> {
    let cart = state.carts().view(&user_id).await?;
    Ok(Json(cart.into()))
}

/// Add an item; quantity defaults to 1.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(form): Json<AddForm>,
) -> Result<Json<CartResponse>> {
    let delta = Quantity::new(form.quantity.unwrap_or(1));
    let cart = state
        .carts()
        .add_item(&user_id, form.product_id, &form.size, delta)
        .await?;
    Ok(Json(cart.into()))
}

/// Set a line's quantity; zero deletes the line.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(form): Json<UpdateForm>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .carts()
        .set_quantity(
            &user_id,
            &form.product_id,
            &form.size,
            Quantity::new(form.quantity),
        )
        .await?;
    Ok(Json(cart.into()))
}

/// Remove a line; removing an absent line succeeds.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(form): Json<RemoveForm>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .carts()
        .remove_item(&user_id, &form.product_id, &form.size)
        .await?;
    Ok(Json(cart.into()))
}

/// Pricing of the current cart.
#[instrument(skip(state))]
pub async fn price(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<PricingView>> {
    let cart = state.carts().view(&user_id).await?;
    Ok(Json(PricingView::from(&cart.pricing)))
}

/// Apply a coupon code to the cart.
#[instrument(skip(state))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(form): Json<CouponForm>,
) -> Result<Json<CartResponse>> {
    let cart = state.carts().apply_coupon(&user_id, &form.code).await?;
    Ok(Json(cart.into()))
}

/// Clear the applied coupon.
#[instrument(skip(state))]
pub async fn clear_coupon(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<CartResponse>> {
    let cart = state.carts().clear_coupon(&user_id).await?;
    Ok(Json(cart.into()))
}
