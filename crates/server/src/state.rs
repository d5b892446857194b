//! Application state shared across handlers.

use std::sync::Arc;

use velvet_core::coupon::CouponBook;

use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::payment::PaymentProvider;
use crate::services::{CartService, OrderService, UserLocks};
use crate::store::Storage;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The storage, catalog, and payment seams
/// are trait objects so tests can inject in-memory collaborators.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn Storage>,
    catalog: Arc<dyn Catalog>,
    payments: Arc<dyn PaymentProvider>,
    coupons: Arc<CouponBook>,
    locks: Arc<UserLocks>,
}

impl AppState {
    /// Assemble application state from its collaborators.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
        payments: Arc<dyn PaymentProvider>,
        coupons: CouponBook,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                payments,
                coupons: Arc::new(coupons),
                locks: Arc::new(UserLocks::default()),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Admin bearer token for the admin routes.
    #[must_use]
    pub fn admin_token(&self) -> &secrecy::SecretString {
        &self.inner.config.admin_token
    }

    /// Cart operations bound to this state.
    #[must_use]
    pub fn carts(&self) -> CartService {
        CartService::new(
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.catalog),
            Arc::clone(&self.inner.coupons),
            Arc::clone(&self.inner.locks),
            self.inner.config.shipping_fee,
        )
    }

    /// Order operations bound to this state.
    #[must_use]
    pub fn orders(&self) -> OrderService {
        OrderService::new(
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.catalog),
            Arc::clone(&self.inner.payments),
            Arc::clone(&self.inner.coupons),
            Arc::clone(&self.inner.locks),
            self.inner.config.shipping_fee,
            self.inner.config.base_url.clone(),
        )
    }

    /// The coupon catalog, for display endpoints.
    #[must_use]
    pub fn coupons(&self) -> &CouponBook {
        &self.inner.coupons
    }
}
