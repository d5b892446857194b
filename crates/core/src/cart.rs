//! Per-user cart: a sparse mapping of product → size → quantity.
//!
//! Invariants:
//! - at most one line per (product, size) pair
//! - quantity zero is never stored; absence is the same observable state
//!
//! The cart never records prices. Prices are re-resolved against the
//! current catalog snapshot at pricing time, so a price change between
//! add-to-cart and checkout is reflected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, Quantity};

/// Validation failures for cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A size must be selected before an item can go in the cart.
    #[error("size must not be empty")]
    EmptySize,

    /// Adding zero units is meaningless; use `remove_item` to delete.
    #[error("quantity delta must be positive")]
    ZeroDelta,
}

/// One (product, size) entry of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: Quantity,
}

/// A single user's cart.
///
/// Serializes as the nested `{product_id: {size: quantity}}` document the
/// storage layer persists. Mutate only through the methods here; they
/// maintain the no-zero-quantity invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<ProductId, BTreeMap<String, Quantity>>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .values()
            .flat_map(BTreeMap::values)
            .map(|q| u64::from(q.get()))
            .sum()
    }

    /// Quantity for a (product, size) pair; zero if absent.
    #[must_use]
    pub fn quantity(&self, product_id: &ProductId, size: &str) -> Quantity {
        self.items
            .get(product_id)
            .and_then(|sizes| sizes.get(size))
            .copied()
            .unwrap_or_default()
    }

    /// All lines in deterministic (product, size) order.
    pub fn lines(&self) -> impl Iterator<Item = CartLine> + '_ {
        self.items.iter().flat_map(|(product_id, sizes)| {
            sizes.iter().map(|(size, quantity)| CartLine {
                product_id: product_id.clone(),
                size: size.clone(),
                quantity: *quantity,
            })
        })
    }

    /// Increment the quantity of a line, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptySize`] for an empty size and
    /// [`CartError::ZeroDelta`] for a zero increment.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        size: &str,
        delta: Quantity,
    ) -> Result<(), CartError> {
        if size.trim().is_empty() {
            return Err(CartError::EmptySize);
        }
        if delta.is_zero() {
            return Err(CartError::ZeroDelta);
        }
        let entry = self
            .items
            .entry(product_id)
            .or_default()
            .entry(size.to_owned())
            .or_default();
        *entry = entry.saturating_add(delta);
        Ok(())
    }

    /// Set the quantity of a line. Setting zero deletes the line, leaving
    /// the same observable state as [`Self::remove_item`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptySize`] for an empty size.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        size: &str,
        quantity: Quantity,
    ) -> Result<(), CartError> {
        if size.trim().is_empty() {
            return Err(CartError::EmptySize);
        }
        if quantity.is_zero() {
            self.remove_item(product_id, size);
        } else {
            self.items
                .entry(product_id.clone())
                .or_default()
                .insert(size.to_owned(), quantity);
        }
        Ok(())
    }

    /// Remove a line. Removing an absent line is a no-op, not an error.
    pub fn remove_item(&mut self, product_id: &ProductId, size: &str) {
        if let Some(sizes) = self.items.get_mut(product_id) {
            sizes.remove(size);
            if sizes.is_empty() {
                self.items.remove(product_id);
            }
        }
    }

    /// Drop any zero-quantity or empty-size entries.
    ///
    /// Persisted documents are written by this type and are already clean,
    /// but records imported from elsewhere pass through here at the
    /// storage boundary so a malformed shape can never enter the domain.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for sizes in self.items.values_mut() {
            sizes.retain(|size, quantity| !size.trim().is_empty() && !quantity.is_zero());
        }
        self.items.retain(|_, sizes| !sizes.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn add_increments_existing_line() {
        let mut cart = Cart::new();
        cart.add_item(p("p1"), "M", Quantity::ONE).expect("add");
        cart.add_item(p("p1"), "M", Quantity::new(2)).expect("add");
        assert_eq!(cart.quantity(&p("p1"), "M"), Quantity::new(3));
        assert_eq!(cart.lines().count(), 1);
    }

    #[test]
    fn sizes_are_independent_lines() {
        let mut cart = Cart::new();
        cart.add_item(p("p1"), "M", Quantity::ONE).expect("add");
        cart.add_item(p("p1"), "L", Quantity::ONE).expect("add");
        assert_eq!(cart.lines().count(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn add_rejects_empty_size() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_item(p("p1"), "  ", Quantity::ONE),
            Err(CartError::EmptySize)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn add_rejects_zero_delta() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_item(p("p1"), "M", Quantity::new(0)),
            Err(CartError::ZeroDelta)
        );
    }

    #[test]
    fn set_zero_equals_remove() {
        let mut removed = Cart::new();
        removed.add_item(p("p1"), "M", Quantity::new(2)).expect("add");
        removed.remove_item(&p("p1"), "M");

        let mut set_to_zero = Cart::new();
        set_to_zero
            .add_item(p("p1"), "M", Quantity::new(2))
            .expect("add");
        set_to_zero
            .set_quantity(&p("p1"), "M", Quantity::new(0))
            .expect("set");

        assert_eq!(removed, set_to_zero);
        assert!(set_to_zero.is_empty());
        assert_eq!(set_to_zero.quantity(&p("p1"), "M"), Quantity::new(0));
    }

    #[test]
    fn set_creates_missing_line() {
        let mut cart = Cart::new();
        cart.set_quantity(&p("p1"), "S", Quantity::new(4)).expect("set");
        assert_eq!(cart.quantity(&p("p1"), "S"), Quantity::new(4));
    }

    #[test]
    fn remove_missing_line_is_noop() {
        let mut cart = Cart::new();
        cart.remove_item(&p("ghost"), "M");
        assert!(cart.is_empty());
    }

    #[test]
    fn item_count_sums_quantities() {
        let mut cart = Cart::new();
        cart.add_item(p("p1"), "M", Quantity::new(2)).expect("add");
        cart.add_item(p("p2"), "S", Quantity::new(5)).expect("add");
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn normalized_prunes_zero_entries() {
        let raw = r#"{"p1":{"M":0,"L":2},"p2":{"S":0}}"#;
        let cart: Cart = serde_json::from_str(raw).expect("deserialize");
        let cart = cart.normalized();
        assert_eq!(cart.lines().count(), 1);
        assert_eq!(cart.quantity(&p("p1"), "L"), Quantity::new(2));
    }

    #[test]
    fn serializes_as_nested_document() {
        let mut cart = Cart::new();
        cart.add_item(p("p1"), "M", Quantity::new(2)).expect("add");
        let json = serde_json::to_string(&cart).expect("serialize");
        assert_eq!(json, r#"{"p1":{"M":2}}"#);
    }
}
