//! The order pricing engine.
//!
//! [`price`] is a pure function from resolved cart lines, an optional
//! applied coupon, and the base shipping fee to a [`Pricing`] breakdown.
//! It mutates nothing and is safe to call any number of times.

use serde::{Deserialize, Serialize};

use crate::coupon::{Coupon, CouponKind, revalidate};
use crate::types::{Money, ProductId, Quantity};

/// A cart line joined against the current catalog snapshot.
///
/// Name, price, and image come from the catalog *now*, not from whenever
/// the item entered the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: Quantity,
    pub name: String,
    pub unit_price: Money,
    pub image: Option<String>,
}

impl ResolvedLine {
    /// Price of this line: unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.saturating_mul_quantity(self.quantity)
    }
}

/// The pricing breakdown of a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub item_count: u64,
}

/// Price a set of resolved lines under an optional applied coupon.
///
/// - `subtotal` = Σ unit price × quantity
/// - shipping is the base fee, or zero for an empty cart or a
///   free-shipping coupon
/// - a flat discount is capped at the subtotal, and the total is clamped
///   at zero, so no combination of promotions produces a negative amount
///
/// A coupon that no longer passes [`revalidate`] against these lines is
/// ignored here as well; clearing it from the session is the caller's
/// job, but pricing never honors a stale coupon either way.
#[must_use]
pub fn price(lines: &[ResolvedLine], coupon: Option<&Coupon>, base_shipping_fee: Money) -> Pricing {
    let subtotal = lines
        .iter()
        .fold(Money::ZERO, |acc, line| acc.saturating_add(line.line_total()));
    let item_count: u64 = lines.iter().map(|line| u64::from(line.quantity.get())).sum();

    let coupon = coupon.filter(|c| revalidate(c, subtotal, lines.is_empty()));

    let mut shipping_fee = if item_count > 0 {
        base_shipping_fee
    } else {
        Money::ZERO
    };
    let mut discount = Money::ZERO;

    if let Some(coupon) = coupon {
        match coupon.kind {
            CouponKind::FreeShipping => shipping_fee = Money::ZERO,
            CouponKind::FlatDiscount => discount = coupon.discount.min(subtotal),
        }
    }

    let total = subtotal.saturating_sub(discount).saturating_add(shipping_fee);

    Pricing {
        subtotal,
        discount,
        shipping_fee,
        total,
        item_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::CouponKind;

    fn line(id: &str, qty: u32, unit_price: i64) -> ResolvedLine {
        ResolvedLine {
            product_id: ProductId::new(id),
            size: "M".to_owned(),
            quantity: Quantity::new(qty),
            name: format!("Product {id}"),
            unit_price: Money::from_major(unit_price),
            image: None,
        }
    }

    fn flat(discount: i64, min_order: i64) -> Coupon {
        Coupon {
            code: "FLAT200".to_owned(),
            kind: CouponKind::FlatDiscount,
            discount: Money::from_major(discount),
            min_order_subtotal: Money::from_major(min_order),
            description: String::new(),
        }
    }

    fn freeship() -> Coupon {
        Coupon {
            code: "FREESHIP".to_owned(),
            kind: CouponKind::FreeShipping,
            discount: Money::ZERO,
            min_order_subtotal: Money::ZERO,
            description: String::new(),
        }
    }

    #[test]
    fn sums_subtotal_and_item_count() {
        let lines = vec![line("p1", 2, 100), line("p2", 3, 50)];
        let pricing = price(&lines, None, Money::from_major(10));
        assert_eq!(pricing.subtotal, Money::from_major(350));
        assert_eq!(pricing.item_count, 5);
        assert_eq!(pricing.shipping_fee, Money::from_major(10));
        assert_eq!(pricing.total, Money::from_major(360));
    }

    #[test]
    fn empty_cart_prices_to_zero() {
        let pricing = price(&[], None, Money::from_major(10));
        assert_eq!(pricing.subtotal, Money::ZERO);
        assert_eq!(pricing.shipping_fee, Money::ZERO);
        assert_eq!(pricing.total, Money::ZERO);
        assert_eq!(pricing.item_count, 0);
    }

    #[test]
    fn ineligible_coupon_is_ignored() {
        // cart = {P1: {M: 2}}, unit price 100, shipping 10, coupon
        // requires a 500 subtotal
        let lines = vec![line("p1", 2, 100)];
        let pricing = price(&lines, Some(&flat(200, 500)), Money::from_major(10));
        assert_eq!(pricing.subtotal, Money::from_major(200));
        assert_eq!(pricing.discount, Money::ZERO);
        assert_eq!(pricing.shipping_fee, Money::from_major(10));
        assert_eq!(pricing.total, Money::from_major(210));
    }

    #[test]
    fn flat_discount_applies_above_minimum() {
        let lines = vec![line("p1", 6, 100)];
        let pricing = price(&lines, Some(&flat(200, 500)), Money::from_major(10));
        assert_eq!(pricing.subtotal, Money::from_major(600));
        assert_eq!(pricing.discount, Money::from_major(200));
        assert_eq!(pricing.total, Money::from_major(410));
    }

    #[test]
    fn free_shipping_zeroes_fee_without_discount() {
        let lines = vec![line("p1", 1, 40)];
        let pricing = price(&lines, Some(&freeship()), Money::from_major(10));
        assert_eq!(pricing.shipping_fee, Money::ZERO);
        assert_eq!(pricing.discount, Money::ZERO);
        assert_eq!(pricing.total, Money::from_major(40));
    }

    #[test]
    fn discount_is_capped_at_subtotal() {
        let lines = vec![line("p1", 1, 100)];
        let pricing = price(&lines, Some(&flat(500, 0)), Money::from_major(10));
        assert_eq!(pricing.discount, Money::from_major(100));
        assert_eq!(pricing.total, Money::from_major(10));
    }

    #[test]
    fn price_is_pure_and_idempotent() {
        let lines = vec![line("p1", 2, 100), line("p2", 1, 75)];
        let coupon = flat(50, 100);
        let first = price(&lines, Some(&coupon), Money::from_major(10));
        let second = price(&lines, Some(&coupon), Money::from_major(10));
        assert_eq!(first, second);
        // inputs untouched
        assert_eq!(lines[0].quantity, Quantity::new(2));
        assert_eq!(coupon.discount, Money::from_major(50));
    }
}
