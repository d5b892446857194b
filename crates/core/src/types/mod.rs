//! Core types for Velvet.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;

pub use id::{OrderId, ProductId, UserId};
pub use money::{Money, Quantity};
