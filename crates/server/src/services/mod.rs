//! Synchronization layer between the pure core and the outside world.
//!
//! The services are the only code that touches storage, the catalog, or
//! the payment provider. Each loads persisted state, runs the pure core
//! logic, and writes the result back.
//!
//! # Per-user serialization
//!
//! Carts are single-writer-per-user: two rapid add-to-cart clicks from
//! the same user must not race a read-modify-write. [`UserLocks`] hands
//! out one async mutex per user; every cart mutation and checkout runs
//! under it. Different users never contend.

pub mod cart;
pub mod orders;

pub use cart::CartService;
pub use orders::OrderService;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use velvet_core::coupon::{CouponBook, revalidate};
use velvet_core::{Cart, Coupon, Money, ResolvedLine, UserId};

use crate::catalog::Catalog;
use crate::error::Result;

/// One mutex per user, created lazily.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Acquire this user's lock, creating it on first use.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(user_id.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Join cart lines against the current catalog snapshot.
///
/// A product that has since left the catalog simply drops out of the
/// resolved view, matching how the storefront always rendered carts; the
/// stored line stays put in case the product returns.
pub(crate) async fn resolve_lines(
    catalog: &dyn Catalog,
    cart: &Cart,
) -> Result<Vec<ResolvedLine>> {
    let mut resolved = Vec::new();
    for line in cart.lines() {
        let Some(product) = catalog.product(&line.product_id).await? else {
            tracing::warn!(product_id = %line.product_id, "cart references unknown product");
            continue;
        };
        resolved.push(ResolvedLine {
            product_id: line.product_id,
            size: line.size,
            quantity: line.quantity,
            name: product.name,
            unit_price: product.price,
            image: product.image,
        });
    }
    Ok(resolved)
}

/// Subtotal over resolved lines.
pub(crate) fn subtotal_of(lines: &[ResolvedLine]) -> Money {
    lines
        .iter()
        .fold(Money::ZERO, |acc, line| acc.saturating_add(line.line_total()))
}

/// Look up the applied coupon for a persisted code and check it is still
/// eligible. Returns `None` (meaning: clear the code) when the code left
/// the coupon catalog, the cart emptied, or the subtotal fell below the
/// coupon minimum.
pub(crate) fn active_coupon<'a>(
    book: &'a CouponBook,
    coupon_code: Option<&str>,
    subtotal: Money,
    cart_is_empty: bool,
) -> Option<&'a Coupon> {
    let coupon = book.find(coupon_code?)?;
    revalidate(coupon, subtotal, cart_is_empty).then_some(coupon)
}
