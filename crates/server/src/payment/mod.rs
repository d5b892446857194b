//! Payment provider seam.
//!
//! Non-COD checkouts redirect the customer to an external provider and
//! settle asynchronously: the order stays `Placed`/unpaid until the
//! session is verified server-side. Verification is the only trusted
//! signal; the browser redirect alone never marks an order paid.

mod stripe;

pub use stripe::StripeProvider;

use async_trait::async_trait;
use thiserror::Error;

use velvet_core::{Order, OrderId};

/// Provider failures, surfaced to callers as dependency errors.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    #[error("payment provider error: {0}")]
    Provider(String),
}

/// A created checkout session: where to send the customer, and the id to
/// verify later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// The provider's answer when a session is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Whether the provider collected the payment.
    pub paid: bool,
    /// The order the session was created for, per the provider's records.
    pub order_id: Option<OrderId>,
}

/// External payment provider operations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session for the order and return the redirect
    /// target.
    async fn create_checkout_session(
        &self,
        order: &Order,
        base_url: &str,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Verify a session with the provider.
    async fn verify_session(&self, session_id: &str) -> Result<SessionOutcome, PaymentError>;
}

/// Provider used when no Stripe key is configured: sessions settle
/// immediately on verification. Development and tests only.
#[derive(Debug, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    const SESSION_PREFIX: &'static str = "offline_";
}

#[async_trait]
impl PaymentProvider for OfflineProvider {
    async fn create_checkout_session(
        &self,
        order: &Order,
        base_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let session_id = format!("{}{}", Self::SESSION_PREFIX, order.id);
        let url = format!(
            "{base_url}/verify?order_id={}&session_id={session_id}",
            order.id
        );
        Ok(CheckoutSession { session_id, url })
    }

    async fn verify_session(&self, session_id: &str) -> Result<SessionOutcome, PaymentError> {
        let order_id = session_id
            .strip_prefix(Self::SESSION_PREFIX)
            .and_then(|raw| raw.parse().ok());
        Ok(SessionOutcome {
            paid: order_id.is_some(),
            order_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use velvet_core::{
        Money, PaymentMethod, Pricing, Quantity, ResolvedLine, ShippingAddress, UserId, price,
    };

    fn order() -> Order {
        let lines = vec![ResolvedLine {
            product_id: "p1".into(),
            size: "M".to_owned(),
            quantity: Quantity::ONE,
            name: "Linen Shirt".to_owned(),
            unit_price: Money::from_major(100),
            image: None,
        }];
        let pricing: Pricing = price(&lines, None, Money::from_major(10));
        Order::create(
            UserId::new("u1"),
            lines,
            pricing,
            None,
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
            },
            PaymentMethod::Stripe,
            Utc::now(),
        )
        .expect("order")
    }

    #[tokio::test]
    async fn offline_session_round_trips_order_id() {
        let provider = OfflineProvider;
        let order = order();
        let session = provider
            .create_checkout_session(&order, "http://localhost")
            .await
            .expect("session");
        let outcome = provider
            .verify_session(&session.session_id)
            .await
            .expect("verify");
        assert!(outcome.paid);
        assert_eq!(outcome.order_id, Some(order.id));
    }

    #[tokio::test]
    async fn garbage_session_does_not_verify() {
        let provider = OfflineProvider;
        let outcome = provider.verify_session("cs_bogus").await.expect("verify");
        assert!(!outcome.paid);
        assert_eq!(outcome.order_id, None);
    }
}
