//! Persistence seam for carts and orders.
//!
//! The core treats storage as a document store with get/put/find
//! operations. Everything behind [`Storage`] must be atomic per call: a
//! reader never observes a partially written cart or order. The core
//! never retries a failed storage call; retry policy belongs to callers,
//! and every operation here is safe to retry.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use velvet_core::{Cart, Order, OrderId, UserId};

/// Storage failures, surfaced to callers as dependency errors.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// The per-user cart document: the cart lines plus the applied coupon
/// code, persisted together so coupon invalidation and cart mutation are
/// a single write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartRecord {
    pub cart: Cart,
    pub coupon_code: Option<String>,
}

/// Document-store operations the synchronization layer relies on.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load a user's cart record; `None` when the user has never added
    /// an item.
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<CartRecord>, StorageError>;

    /// Replace a user's cart record.
    async fn put_cart(&self, user_id: &UserId, record: CartRecord) -> Result<(), StorageError>;

    /// Delete a user's cart record. Deleting an absent record is a no-op.
    async fn delete_cart(&self, user_id: &UserId) -> Result<(), StorageError>;

    /// Load an order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StorageError>;

    /// Insert or replace an order.
    async fn put_order(&self, order: Order) -> Result<(), StorageError>;

    /// All orders for one user, newest first.
    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, StorageError>;

    /// Every order in the store, newest first (admin projection).
    async fn list_all_orders(&self) -> Result<Vec<Order>, StorageError>;
}
