//! Order snapshots and the fulfillment lifecycle.
//!
//! An order is created once at checkout from the priced cart; its lines
//! and pricing are frozen from then on. Only `status` and `paid` change
//! afterwards, and only through the methods here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::{Pricing, ResolvedLine};
use crate::types::{Money, OrderId, ProductId, Quantity, UserId};

/// Fulfillment status of an order.
///
/// Wire strings match the admin console's status dropdown. Any status is
/// reachable from any non-terminal status (admin corrections included);
/// a terminal status cannot be left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Placed")]
    Placed,
    Processing,
    Packing,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the lifecycle ends here.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Placed => "Order Placed",
            Self::Processing => "Processing",
            Self::Packing => "Packing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery: the order counts as settled at placement.
    Cod,
    /// Stripe checkout: the order stays unpaid until the session is
    /// verified.
    Stripe,
}

/// Delivery details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub phone: String,
}

/// An immutable line of an order, snapshotted from a resolved cart line.
///
/// Name, price, and image are frozen here; later catalog changes do not
/// touch existing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: Quantity,
    pub name: String,
    pub unit_price: Money,
    pub image: Option<String>,
}

impl From<ResolvedLine> for OrderLine {
    fn from(line: ResolvedLine) -> Self {
        Self {
            product_id: line.product_id,
            size: line.size,
            quantity: line.quantity,
            name: line.name,
            unit_price: line.unit_price,
            image: line.image,
        }
    }
}

/// Lifecycle failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Checkout with no cart lines.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// Attempt to move an order out of a terminal status.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub pricing: Pricing,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub paid: bool,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot a priced cart into a new order.
    ///
    /// Status starts at `Placed`. Cash-on-delivery orders are considered
    /// paid immediately; Stripe orders stay unpaid until confirmation.
    ///
    /// # Errors
    ///
    /// [`OrderError::EmptyCart`] when there are no lines to snapshot.
    pub fn create(
        user_id: UserId,
        lines: Vec<ResolvedLine>,
        pricing: Pricing,
        coupon_code: Option<String>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        Ok(Self {
            id: OrderId::generate(),
            user_id,
            lines: lines.into_iter().map(OrderLine::from).collect(),
            pricing,
            status: OrderStatus::Placed,
            payment_method,
            paid: matches!(payment_method, PaymentMethod::Cod),
            coupon_code,
            shipping_address,
            created_at,
        })
    }

    /// Admin status change.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidTransition`] when the order is already in a
    /// terminal status.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() && next != self.status {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Record a successful payment confirmation.
    ///
    /// Idempotent: the first call marks the order paid and advances a
    /// `Placed` order to `Processing`; re-delivery of the same
    /// confirmation returns `false` and changes nothing, so a webhook
    /// retry can never double-advance the lifecycle.
    pub fn mark_paid(&mut self) -> bool {
        if self.paid {
            return false;
        }
        self.paid = true;
        if self.status == OrderStatus::Placed {
            self.status = OrderStatus::Processing;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::price;

    fn resolved(qty: u32, unit_price: i64) -> ResolvedLine {
        ResolvedLine {
            product_id: ProductId::new("p1"),
            size: "M".to_owned(),
            quantity: Quantity::new(qty),
            name: "Linen Shirt".to_owned(),
            unit_price: Money::from_major(unit_price),
            image: Some("shirt.jpg".to_owned()),
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            street: "1 Analytical Way".to_owned(),
            city: "London".to_owned(),
            state: "LDN".to_owned(),
            zipcode: "00001".to_owned(),
            country: "UK".to_owned(),
            phone: "555-0100".to_owned(),
        }
    }

    fn placed(method: PaymentMethod) -> Order {
        let lines = vec![resolved(2, 100)];
        let pricing = price(&lines, None, Money::from_major(10));
        Order::create(
            UserId::new("u1"),
            lines,
            pricing,
            None,
            address(),
            method,
            Utc::now(),
        )
        .expect("order")
    }

    #[test]
    fn empty_cart_cannot_become_an_order() {
        let err = Order::create(
            UserId::new("u1"),
            Vec::new(),
            price(&[], None, Money::from_major(10)),
            None,
            address(),
            PaymentMethod::Cod,
            Utc::now(),
        )
        .expect_err("empty cart");
        assert_eq!(err, OrderError::EmptyCart);
    }

    #[test]
    fn cod_orders_are_paid_at_placement() {
        let order = placed(PaymentMethod::Cod);
        assert!(order.paid);
        assert_eq!(order.status, OrderStatus::Placed);
    }

    #[test]
    fn stripe_orders_start_unpaid() {
        let order = placed(PaymentMethod::Stripe);
        assert!(!order.paid);
        assert_eq!(order.status, OrderStatus::Placed);
    }

    #[test]
    fn snapshot_freezes_line_data() {
        let order = placed(PaymentMethod::Cod);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].name, "Linen Shirt");
        assert_eq!(order.lines[0].unit_price, Money::from_major(100));
        assert_eq!(order.pricing.total, Money::from_major(210));
    }

    #[test]
    fn mark_paid_is_idempotent() {
        let mut order = placed(PaymentMethod::Stripe);
        assert!(order.mark_paid());
        assert!(order.paid);
        assert_eq!(order.status, OrderStatus::Processing);

        // re-delivery of the same confirmation
        assert!(!order.mark_paid());
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn mark_paid_leaves_admin_advanced_status_alone() {
        let mut order = placed(PaymentMethod::Stripe);
        order.transition(OrderStatus::Packing).expect("transition");
        assert!(order.mark_paid());
        assert_eq!(order.status, OrderStatus::Packing);
    }

    #[test]
    fn any_status_is_reachable_from_non_terminal() {
        let mut order = placed(PaymentMethod::Cod);
        order.transition(OrderStatus::Shipped).expect("forward");
        order.transition(OrderStatus::Processing).expect("backward");
        order.transition(OrderStatus::Cancelled).expect("cancel");
    }

    #[test]
    fn terminal_status_cannot_be_left() {
        let mut order = placed(PaymentMethod::Cod);
        order.transition(OrderStatus::Delivered).expect("deliver");
        let err = order
            .transition(OrderStatus::Processing)
            .expect_err("terminal");
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Processing,
            }
        );
        // re-asserting the same terminal status is allowed (idempotent admin click)
        order.transition(OrderStatus::Delivered).expect("same status");
    }

    #[test]
    fn status_uses_console_wire_strings() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).expect("serialize");
        assert_eq!(json, "\"Out for Delivery\"");
        let back: OrderStatus = serde_json::from_str("\"Order Placed\"").expect("deserialize");
        assert_eq!(back, OrderStatus::Placed);
    }
}
