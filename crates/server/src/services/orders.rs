//! Order lifecycle service.
//!
//! Creates immutable order snapshots from priced carts, drives status
//! transitions, and reconciles asynchronous payment confirmations.
//! `place` is the only durability boundary: abandoning checkout before it
//! completes leaves no persisted side effects.

use std::sync::Arc;

use chrono::Utc;
use velvet_core::coupon::CouponBook;
use velvet_core::{
    Money, Order, OrderId, OrderStatus, PaymentMethod, ShippingAddress, UserId, price,
};

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::payment::PaymentProvider;
use crate::store::Storage;

use super::{UserLocks, active_coupon, resolve_lines, subtotal_of};

/// Result of placing an order: the snapshot, plus the payment redirect
/// for non-COD methods.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub redirect_url: Option<String>,
}

/// Order operations for one request.
pub struct OrderService {
    store: Arc<dyn Storage>,
    catalog: Arc<dyn Catalog>,
    payments: Arc<dyn PaymentProvider>,
    coupons: Arc<CouponBook>,
    locks: Arc<UserLocks>,
    shipping_fee: Money,
    base_url: String,
}

impl OrderService {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        store: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
        payments: Arc<dyn PaymentProvider>,
        coupons: Arc<CouponBook>,
        locks: Arc<UserLocks>,
        shipping_fee: Money,
        base_url: String,
    ) -> Self {
        Self {
            store,
            catalog,
            payments,
            coupons,
            locks,
            shipping_fee,
            base_url,
        }
    }

    /// Snapshot the user's priced cart into an order.
    ///
    /// Runs under the user's cart lock so checkout cannot interleave with
    /// a cart mutation. Nothing is persisted before the snapshot exists;
    /// an empty cart fails before any write. After the order is stored
    /// the cart record is deleted - a failure between those two writes
    /// surfaces as a dependency error rather than being swallowed, and
    /// the delete is a no-op on retry.
    pub async fn place(
        &self,
        user_id: &UserId,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<PlacedOrder> {
        let _guard = self.locks.acquire(user_id).await;

        let record = self.store.get_cart(user_id).await?.unwrap_or_default();
        let cart = record.cart.normalized();
        let lines = resolve_lines(self.catalog.as_ref(), &cart).await?;
        let subtotal = subtotal_of(&lines);
        let coupon = active_coupon(
            &self.coupons,
            record.coupon_code.as_deref(),
            subtotal,
            lines.is_empty(),
        );

        let pricing = price(&lines, coupon, self.shipping_fee);
        let order = Order::create(
            user_id.clone(),
            lines,
            pricing,
            coupon.map(|c| c.code.clone()),
            shipping_address,
            payment_method,
            Utc::now(),
        )?;

        self.store.put_order(order.clone()).await?;
        self.store.delete_cart(user_id).await?;

        let redirect_url = match payment_method {
            PaymentMethod::Cod => None,
            PaymentMethod::Stripe => {
                let session = self
                    .payments
                    .create_checkout_session(&order, &self.base_url)
                    .await?;
                Some(session.url)
            }
        };

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.pricing.total.display(),
            method = ?payment_method,
            "order placed"
        );

        Ok(PlacedOrder {
            order,
            redirect_url,
        })
    }

    /// Reconcile an external payment confirmation.
    ///
    /// Idempotent: re-delivering the same successful confirmation finds
    /// the order already paid and changes nothing. An unpaid or cancelled
    /// session leaves the order `Placed`/unpaid so the customer can retry
    /// without losing the snapshot - payment failure never auto-cancels.
    pub async fn confirm_payment(
        &self,
        user_id: &UserId,
        order_id: OrderId,
        session_id: &str,
    ) -> Result<Order> {
        let mut order = self.owned_order(user_id, order_id).await?;

        let outcome = self.payments.verify_session(session_id).await?;
        if outcome.order_id != Some(order_id) {
            return Err(AppError::PaymentVerification(format!(
                "session {session_id} does not reference order {order_id}"
            )));
        }

        if !outcome.paid {
            tracing::info!(order_id = %order_id, "payment not completed, order left placed");
            return Ok(order);
        }

        if order.mark_paid() {
            self.store.put_order(order.clone()).await?;
            tracing::info!(order_id = %order_id, "payment confirmed");
        }
        Ok(order)
    }

    /// The caller's orders, newest first.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        Ok(self.store.list_orders_by_user(user_id).await?)
    }

    /// Every order, newest first. Admin projection.
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        Ok(self.store.list_all_orders().await?)
    }

    /// Admin status change, checked against the lifecycle state machine.
    pub async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        order.transition(status)?;
        self.store.put_order(order.clone()).await?;
        tracing::info!(order_id = %order_id, status = %status, "order status updated");
        Ok(order)
    }

    async fn owned_order(&self, user_id: &UserId, order_id: OrderId) -> Result<Order> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        if &order.user_id != user_id {
            // Do not leak other users' order ids
            return Err(AppError::NotFound(format!("order {order_id}")));
        }
        Ok(order)
    }
}
