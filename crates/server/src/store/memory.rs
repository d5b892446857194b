//! In-memory document store.
//!
//! The default backing store: two `RwLock`-guarded maps. Each trait call
//! takes the lock once, so individual reads and writes are atomic; the
//! per-user serialization that protects read-modify-write sequences lives
//! in the service layer, not here.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use velvet_core::{Order, OrderId, UserId};

use super::{CartRecord, Storage, StorageError};

/// `HashMap`-backed storage for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    carts: RwLock<HashMap<UserId, CartRecord>>,
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<CartRecord>, StorageError> {
        Ok(self.carts.read().await.get(user_id).cloned())
    }

    async fn put_cart(&self, user_id: &UserId, record: CartRecord) -> Result<(), StorageError> {
        self.carts.write().await.insert(user_id.clone(), record);
        Ok(())
    }

    async fn delete_cart(&self, user_id: &UserId) -> Result<(), StorageError> {
        self.carts.write().await.remove(user_id);
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn put_order(&self, order: Order) -> Result<(), StorageError> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, StorageError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|order| &order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>, StorageError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
