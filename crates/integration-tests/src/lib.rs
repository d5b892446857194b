//! Test harness for driving the Velvet server over HTTP.
//!
//! Each test gets its own server on an ephemeral port, backed by the
//! in-memory store, a fixture catalog, and the offline payment provider.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use reqwest::RequestBuilder;
use serde_json::Value;

use velvet_core::coupon::{Coupon, CouponBook, CouponKind};
use velvet_core::Money;
use velvet_server::catalog::{MemoryCatalog, Product};
use velvet_server::config::ServerConfig;
use velvet_server::payment::OfflineProvider;
use velvet_server::routes;
use velvet_server::state::AppState;
use velvet_server::store::MemoryStore;

/// Bearer token the test config accepts on admin routes.
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// A running server and a client to talk to it.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

/// Fixture catalog.
///
/// - `p1` Linen Shirt, 100.00, sizes S/M/L
/// - `p2` Denim Jacket, 150.00, sizes M/L
/// - `p3` Wool Socks, 40.00, one size
#[must_use]
pub fn fixture_products() -> Vec<Product> {
    vec![
        Product {
            id: "p1".into(),
            name: "Linen Shirt".to_owned(),
            price: Money::from_major(100),
            image: Some("linen-shirt.jpg".to_owned()),
            sizes: vec!["S".to_owned(), "M".to_owned(), "L".to_owned()],
        },
        Product {
            id: "p2".into(),
            name: "Denim Jacket".to_owned(),
            price: Money::from_major(150),
            image: None,
            sizes: vec!["M".to_owned(), "L".to_owned()],
        },
        Product {
            id: "p3".into(),
            name: "Wool Socks".to_owned(),
            price: Money::from_major(40),
            image: None,
            sizes: vec!["OS".to_owned()],
        },
    ]
}

/// The built-in coupons plus `FLAT200` (flat 200 off a 500 minimum),
/// which the worked pricing examples use.
#[must_use]
pub fn fixture_coupons() -> CouponBook {
    let mut coupons = CouponBook::builtin().all().to_vec();
    coupons.push(Coupon {
        code: "FLAT200".to_owned(),
        kind: CouponKind::FlatDiscount,
        discount: Money::from_major(200),
        min_order_subtotal: Money::from_major(500),
        description: "Flat $200 off orders of $500 or more".to_owned(),
    });
    CouponBook::new(coupons)
}

impl TestApp {
    /// Start a fresh server on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind; tests have no recovery path.
    pub async fn spawn() -> Self {
        let state = AppState::new(
            ServerConfig::for_tests(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryCatalog::from_products(fixture_products())),
            Arc::new(OfflineProvider),
            fixture_coupons(),
        );
        let app = routes::router().with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    /// GET as the given user.
    #[must_use]
    pub fn get(&self, path: &str, user: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .header("x-user-id", user)
    }

    /// POST a JSON body as the given user.
    #[must_use]
    pub fn post(&self, path: &str, user: &str, body: &Value) -> RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .header("x-user-id", user)
            .json(body)
    }

    /// DELETE as the given user.
    #[must_use]
    pub fn delete(&self, path: &str, user: &str) -> RequestBuilder {
        self.client
            .delete(format!("{}{path}", self.base_url))
            .header("x-user-id", user)
    }

    /// GET with the admin bearer token.
    #[must_use]
    pub fn admin_get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(ADMIN_TOKEN)
    }

    /// POST a JSON body with the admin bearer token.
    #[must_use]
    pub fn admin_post(&self, path: &str, body: &Value) -> RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(ADMIN_TOKEN)
            .json(body)
    }
}

/// A plausible checkout address for order placement.
#[must_use]
pub fn fixture_address() -> Value {
    serde_json::json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "ada@example.com",
        "street": "1 Analytical Way",
        "city": "London",
        "state": "LDN",
        "zipcode": "00001",
        "country": "UK",
        "phone": "555-0100"
    })
}
