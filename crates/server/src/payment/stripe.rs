//! Stripe checkout-session provider.
//!
//! Talks to the Stripe REST API directly with `reqwest`. The session is
//! created for the order's final total (discount and shipping already
//! folded in) and tagged with the order id in the session metadata, so
//! verification can prove which order a session settles.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use velvet_core::{Money, Order, OrderId};

use super::{CheckoutSession, PaymentError, PaymentProvider, SessionOutcome};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe payment provider.
pub struct StripeProvider {
    client: Client,
    secret_key: SecretString,
    api_base: String,
}

impl StripeProvider {
    /// Create a provider with the given API key.
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            api_base: STRIPE_API_BASE.to_owned(),
        }
    }

    /// Point the provider at a different API base (stripe-mock in tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Stripe wants amounts in the smallest currency unit.
fn to_cents(amount: Money) -> Result<i64, PaymentError> {
    (amount.amount() * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| PaymentError::Provider(format!("amount out of range: {}", amount.display())))
}

#[derive(Debug, Deserialize)]
struct CreatedSession {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RetrievedSession {
    payment_status: String,
    #[serde(default)]
    metadata: SessionMetadata,
}

#[derive(Debug, Deserialize, Default)]
struct SessionMetadata {
    order_id: Option<String>,
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_checkout_session(
        &self,
        order: &Order,
        base_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let total_cents = to_cents(order.pricing.total)?.to_string();
        let order_id = order.id.to_string();
        let success_url = format!(
            "{base_url}/verify?success=true&order_id={order_id}&session_id={{CHECKOUT_SESSION_ID}}"
        );
        let cancel_url = format!("{base_url}/verify?success=false&order_id={order_id}");
        let line_name = format!("Order {order_id}");

        let params = [
            ("mode", "payment"),
            ("success_url", success_url.as_str()),
            ("cancel_url", cancel_url.as_str()),
            ("metadata[order_id]", order_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", "usd"),
            ("line_items[0][price_data][unit_amount]", total_cents.as_str()),
            ("line_items[0][price_data][product_data][name]", line_name.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(format!("create session: {e}")))?
            .error_for_status()
            .map_err(|e| PaymentError::Provider(format!("create session: {e}")))?;

        let session: CreatedSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Provider(format!("create session body: {e}")))?;

        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url,
        })
    }

    async fn verify_session(&self, session_id: &str) -> Result<SessionOutcome, PaymentError> {
        let response = self
            .client
            .get(format!("{}/checkout/sessions/{session_id}", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| PaymentError::Provider(format!("retrieve session: {e}")))?
            .error_for_status()
            .map_err(|e| PaymentError::Provider(format!("retrieve session: {e}")))?;

        let session: RetrievedSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Provider(format!("retrieve session body: {e}")))?;

        let order_id: Option<OrderId> = session
            .metadata
            .order_id
            .as_deref()
            .and_then(|raw| raw.parse().ok());

        Ok(SessionOutcome {
            paid: session.payment_status == "paid",
            order_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn converts_decimal_amounts_to_cents() {
        assert_eq!(to_cents(Money::from_major(410)).expect("cents"), 41000);
        assert_eq!(
            to_cents(Money::new(Decimal::new(1999, 2))).expect("cents"),
            1999
        );
    }
}
