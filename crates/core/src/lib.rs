//! Velvet Core - Cart and order computation domain.
//!
//! This crate holds the pure logic of the shop: cart mutation rules,
//! coupon eligibility, order pricing, and the order lifecycle state
//! machine. It is consumed by:
//! - `server` - REST backend wiring this logic to storage and payments
//! - `integration-tests` - End-to-end tests over the HTTP surface
//!
//! # Architecture
//!
//! The core crate contains only types and functions - no I/O, no storage
//! access, no HTTP clients. Everything in here is deterministic: given the
//! same cart, catalog snapshot, and coupon, the same pricing comes out.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money amounts, and quantities
//! - [`cart`] - Per-user cart mapping with add/set/remove rules
//! - [`coupon`] - Coupon catalog, eligibility evaluation, revalidation
//! - [`pricing`] - The pure pricing function over resolved cart lines
//! - [`order`] - Immutable order snapshots and the status state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod coupon;
pub mod order;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartError, CartLine};
pub use coupon::{Coupon, CouponBook, CouponKind, CouponRejection};
pub use order::{Order, OrderError, OrderLine, OrderStatus, PaymentMethod, ShippingAddress};
pub use pricing::{Pricing, ResolvedLine, price};
pub use types::*;
