//! Decimal money amounts and integer quantities.
//!
//! All accumulation happens on exact `Decimal` values; rounding to two
//! decimal places only happens at presentation time via [`Money::display`],
//! so repeated additions never compound rounding error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency.
///
/// Arithmetic saturates at the `Decimal` range instead of panicking, and
/// subtraction clamps at zero: a discount can never drive a total negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a money amount from whole currency units.
    #[must_use]
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Add two amounts, saturating at the decimal range.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtract, clamping at zero rather than going negative.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        let result = self.0.saturating_sub(other.0);
        if result.is_sign_negative() {
            Self::ZERO
        } else {
            Self(result)
        }
    }

    /// Multiply a unit price by a line quantity.
    #[must_use]
    pub fn saturating_mul_quantity(self, quantity: Quantity) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity.get())))
    }

    /// The smaller of two amounts. Used to cap discounts at the subtotal.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// Format for display, rounded to two decimal places (e.g. `$19.99`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

/// A non-negative line quantity.
///
/// Negative quantities are unrepresentable; zero is valid as an *input*
/// (set-to-zero deletes a cart line) but is never stored in a cart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// One unit, the default add-to-cart increment.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Whether this quantity is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_sub_clamps_at_zero() {
        let small = Money::from_major(100);
        let large = Money::from_major(250);
        assert_eq!(small.saturating_sub(large), Money::ZERO);
        assert_eq!(large.saturating_sub(small), Money::from_major(150));
    }

    #[test]
    fn mul_quantity_is_exact() {
        let price = Money::new(Decimal::new(1999, 2)); // 19.99
        let line = price.saturating_mul_quantity(Quantity::new(3));
        assert_eq!(line.amount(), Decimal::new(5997, 2));
    }

    #[test]
    fn display_rounds_only_at_presentation() {
        let price = Money::new(Decimal::new(10, 1)); // 1.0
        assert_eq!(price.display(), "$1.00");
        let thirds = Money::new(Decimal::new(3333, 3)); // 3.333
        assert_eq!(thirds.display(), "$3.33");
        // The stored amount keeps full precision
        assert_eq!(thirds.amount(), Decimal::new(3333, 3));
    }

    #[test]
    fn money_serializes_as_decimal_string() {
        let price = Money::new(Decimal::new(1050, 2));
        let json = serde_json::to_string(&price).expect("serialize");
        assert_eq!(json, "\"10.50\"");
        let back: Money = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, price);
    }

    #[test]
    fn quantity_saturates() {
        let q = Quantity::new(u32::MAX);
        assert_eq!(q.saturating_add(Quantity::ONE), Quantity::new(u32::MAX));
    }
}
