//! Cart service: loads persisted cart state, applies the core mutation
//! rules, and keeps the applied coupon honest.
//!
//! Every mutation re-validates the applied coupon against the *new* cart
//! state before persisting, and every read re-validates before pricing,
//! so a stale coupon is never observable (eager invalidation).

use std::sync::Arc;

use velvet_core::coupon::CouponBook;
use velvet_core::{Coupon, Money, Pricing, ProductId, Quantity, ResolvedLine, UserId, price};

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::store::{CartRecord, Storage};

use super::{UserLocks, active_coupon, resolve_lines, subtotal_of};

/// A cart joined against the catalog and priced, ready for display.
#[derive(Debug, Clone)]
pub struct PricedCart {
    pub lines: Vec<ResolvedLine>,
    pub coupon: Option<Coupon>,
    pub pricing: Pricing,
}

/// Cart operations for one request.
pub struct CartService {
    store: Arc<dyn Storage>,
    catalog: Arc<dyn Catalog>,
    coupons: Arc<CouponBook>,
    locks: Arc<UserLocks>,
    shipping_fee: Money,
}

impl CartService {
    pub(crate) fn new(
        store: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
        coupons: Arc<CouponBook>,
        locks: Arc<UserLocks>,
        shipping_fee: Money,
    ) -> Self {
        Self {
            store,
            catalog,
            coupons,
            locks,
            shipping_fee,
        }
    }

    /// Current cart, priced. Never fails for a user without a cart: an
    /// absent record reads as an empty cart.
    pub async fn view(&self, user_id: &UserId) -> Result<PricedCart> {
        let _guard = self.locks.acquire(user_id).await;
        let record = self.load(user_id).await?;
        self.settle(user_id, record).await
    }

    /// Add units of a (product, size) line.
    ///
    /// The product must exist in the catalog and offer the size; the
    /// core additionally rejects empty sizes and zero deltas.
    pub async fn add_item(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        size: &str,
        delta: Quantity,
    ) -> Result<PricedCart> {
        let _guard = self.locks.acquire(user_id).await;
        let product = self
            .catalog
            .product(&product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
        if !size.trim().is_empty() && !product.has_size(size) {
            return Err(AppError::Validation(format!(
                "product {product_id} is not offered in size {size}"
            )));
        }

        let mut record = self.load(user_id).await?;
        record.cart.add_item(product_id, size, delta)?;
        self.settle(user_id, record).await
    }

    /// Set the exact quantity of a line; zero deletes it.
    pub async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        size: &str,
        quantity: Quantity,
    ) -> Result<PricedCart> {
        let _guard = self.locks.acquire(user_id).await;
        let mut record = self.load(user_id).await?;
        record.cart.set_quantity(product_id, size, quantity)?;
        self.settle(user_id, record).await
    }

    /// Remove a line. Removing an absent line is a no-op.
    pub async fn remove_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        size: &str,
    ) -> Result<PricedCart> {
        let _guard = self.locks.acquire(user_id).await;
        let mut record = self.load(user_id).await?;
        record.cart.remove_item(product_id, size);
        self.settle(user_id, record).await
    }

    /// Apply a coupon code to the current cart.
    ///
    /// Rejections carry structure: an unknown code maps to not-found, an
    /// unmet minimum to a shortfall the UI can render.
    pub async fn apply_coupon(&self, user_id: &UserId, code: &str) -> Result<PricedCart> {
        let _guard = self.locks.acquire(user_id).await;
        let mut record = self.load(user_id).await?;
        if record.cart.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let lines = resolve_lines(self.catalog.as_ref(), &record.cart).await?;
        let subtotal = subtotal_of(&lines);
        let coupon = self.coupons.evaluate(code, subtotal)?;
        record.coupon_code = Some(coupon.code.clone());

        self.store.put_cart(user_id, record.clone()).await?;
        Ok(self.priced(record, lines))
    }

    /// Drop the applied coupon, if any.
    pub async fn clear_coupon(&self, user_id: &UserId) -> Result<PricedCart> {
        let _guard = self.locks.acquire(user_id).await;
        let mut record = self.load(user_id).await?;
        record.coupon_code = None;
        self.settle(user_id, record).await
    }

    async fn load(&self, user_id: &UserId) -> Result<CartRecord> {
        let record = self.store.get_cart(user_id).await?.unwrap_or_default();
        Ok(CartRecord {
            cart: record.cart.normalized(),
            coupon_code: record.coupon_code,
        })
    }

    /// Re-validate the coupon against the current cart state, persist the
    /// record, and price it. The single exit path for every cart read and
    /// mutation: by the time a `PricedCart` leaves this service, the
    /// persisted coupon is either eligible or gone.
    async fn settle(&self, user_id: &UserId, mut record: CartRecord) -> Result<PricedCart> {
        let lines = resolve_lines(self.catalog.as_ref(), &record.cart).await?;
        let subtotal = subtotal_of(&lines);
        let keep = active_coupon(
            &self.coupons,
            record.coupon_code.as_deref(),
            subtotal,
            lines.is_empty(),
        )
        .is_some();
        if !keep && record.coupon_code.take().is_some() {
            tracing::info!(user_id = %user_id, "cleared ineligible coupon");
        }

        self.store.put_cart(user_id, record.clone()).await?;
        Ok(self.priced(record, lines))
    }

    fn priced(&self, record: CartRecord, lines: Vec<ResolvedLine>) -> PricedCart {
        let coupon = active_coupon(
            &self.coupons,
            record.coupon_code.as_deref(),
            subtotal_of(&lines),
            lines.is_empty(),
        )
        .cloned();
        let pricing = price(&lines, coupon.as_ref(), self.shipping_fee);
        PricedCart {
            lines,
            coupon,
            pricing,
        }
    }
}
