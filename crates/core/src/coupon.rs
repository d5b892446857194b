//! Promotional coupons and eligibility rules.
//!
//! The coupon catalog is static configuration, not user data. At most one
//! coupon is applied to a cart at a time, and an applied coupon is
//! re-validated after every cart mutation and before every pricing call:
//! the moment the subtotal falls below the coupon's minimum (or the cart
//! empties) the coupon is cleared. A stale coupon is never observable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Money;

/// What a coupon does when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Subtract a flat amount from the subtotal.
    FlatDiscount,
    /// Waive the shipping fee.
    FreeShipping,
}

/// A named promotional rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique code, stored uppercase; lookup is case-insensitive.
    pub code: String,
    pub kind: CouponKind,
    /// Flat amount off the subtotal. Ignored for free-shipping coupons.
    pub discount: Money,
    /// Minimum subtotal required for the coupon to be eligible.
    pub min_order_subtotal: Money,
    /// Customer-facing blurb shown next to the code.
    pub description: String,
}

/// Why a candidate coupon code was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    /// The code does not exist in the catalog.
    #[error("invalid coupon code")]
    InvalidCode,

    /// The cart subtotal is below the coupon's minimum. Carries the
    /// shortfall so callers can render "add $X more" messaging.
    #[error("order subtotal is {} short of the coupon minimum", shortfall.display())]
    BelowMinimum { shortfall: Money },
}

/// The static coupon catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl CouponBook {
    /// Build a catalog from a list of coupons. Codes are normalized to
    /// uppercase.
    #[must_use]
    pub fn new(coupons: Vec<Coupon>) -> Self {
        let coupons = coupons
            .into_iter()
            .map(|mut coupon| {
                coupon.code = coupon.code.to_uppercase();
                coupon
            })
            .collect();
        Self { coupons }
    }

    /// The promotions the shop launched with: a flat 125 off orders of
    /// 500 or more, and free shipping with no minimum.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Coupon {
                code: "NEW125".to_owned(),
                kind: CouponKind::FlatDiscount,
                discount: Money::from_major(125),
                min_order_subtotal: Money::from_major(500),
                description: "Get flat $125 off on cart value of $500 & above".to_owned(),
            },
            Coupon {
                code: "FREESHIP".to_owned(),
                kind: CouponKind::FreeShipping,
                discount: Money::ZERO,
                min_order_subtotal: Money::ZERO,
                description: "Shipping on us for your first purchase".to_owned(),
            },
        ])
    }

    /// Look up a coupon by code, case-insensitively.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        let code = code.trim().to_uppercase();
        self.coupons.iter().find(|coupon| coupon.code == code)
    }

    /// All coupons, for display.
    #[must_use]
    pub fn all(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Decide whether a candidate code applies to the given subtotal.
    ///
    /// # Errors
    ///
    /// [`CouponRejection::InvalidCode`] for an unknown code, and
    /// [`CouponRejection::BelowMinimum`] (with the shortfall amount) when
    /// the subtotal does not reach the coupon's minimum.
    pub fn evaluate(&self, code: &str, subtotal: Money) -> Result<&Coupon, CouponRejection> {
        let coupon = self.find(code).ok_or(CouponRejection::InvalidCode)?;
        if subtotal < coupon.min_order_subtotal {
            return Err(CouponRejection::BelowMinimum {
                shortfall: coupon.min_order_subtotal.saturating_sub(subtotal),
            });
        }
        Ok(coupon)
    }
}

/// Whether an already-applied coupon may stay applied.
///
/// Runs after every cart mutation and before every pricing call; the
/// caller must clear the coupon when this returns `false`.
#[must_use]
pub fn revalidate(coupon: &Coupon, subtotal: Money, cart_is_empty: bool) -> bool {
    !cart_is_empty && subtotal >= coupon.min_order_subtotal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(code: &str, discount: i64, min_order: i64) -> Coupon {
        Coupon {
            code: code.to_owned(),
            kind: CouponKind::FlatDiscount,
            discount: Money::from_major(discount),
            min_order_subtotal: Money::from_major(min_order),
            description: String::new(),
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        let book = CouponBook::builtin();
        assert_eq!(
            book.evaluate("NOPE", Money::from_major(1000)),
            Err(CouponRejection::InvalidCode)
        );
    }

    #[test]
    fn below_minimum_reports_shortfall() {
        let book = CouponBook::new(vec![flat("FLAT200", 200, 500)]);
        let rejection = book
            .evaluate("FLAT200", Money::from_major(200))
            .expect_err("should be ineligible");
        assert_eq!(
            rejection,
            CouponRejection::BelowMinimum {
                shortfall: Money::from_major(300)
            }
        );
    }

    #[test]
    fn eligible_code_is_accepted() {
        let book = CouponBook::new(vec![flat("FLAT200", 200, 500)]);
        let coupon = book
            .evaluate("FLAT200", Money::from_major(600))
            .expect("eligible");
        assert_eq!(coupon.discount, Money::from_major(200));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let book = CouponBook::builtin();
        assert!(book.find("freeship").is_some());
        assert!(book.evaluate(" new125 ", Money::from_major(500)).is_ok());
    }

    #[test]
    fn exact_minimum_is_eligible() {
        let book = CouponBook::new(vec![flat("FLAT200", 200, 500)]);
        assert!(book.evaluate("FLAT200", Money::from_major(500)).is_ok());
    }

    #[test]
    fn revalidate_fails_on_empty_cart() {
        let coupon = flat("FLAT200", 200, 0);
        assert!(!revalidate(&coupon, Money::ZERO, true));
    }

    #[test]
    fn revalidate_fails_below_minimum() {
        let coupon = flat("FLAT200", 200, 500);
        assert!(!revalidate(&coupon, Money::from_major(499), false));
        assert!(revalidate(&coupon, Money::from_major(500), false));
    }
}
