use async_trait::async_trait;
use thiserror::Error;

use comanda_core::domain::cart::CartItem;
use comanda_core::domain::customer::{CustomerProfile, SenderId};
use comanda_core::domain::order::{Order, OrderId};
use comanda_core::errors::DomainError;

pub mod memory;

pub use memory::{InMemoryCartStore, InMemoryOrderLedger, InMemoryProfileStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("order {0} is not in the ledger")]
    OrderNotFound(OrderId),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, sender: &SenderId) -> Result<Option<CustomerProfile>, StoreError>;
    async fn save(&self, profile: CustomerProfile) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn items(&self, sender: &SenderId) -> Result<Vec<CartItem>, StoreError>;
    async fn add(&self, sender: &SenderId, item: CartItem) -> Result<(), StoreError>;
    /// Empties the sender's cart and hands back what it held.
    async fn take(&self, sender: &SenderId) -> Result<Vec<CartItem>, StoreError>;
}

/// Every placed order across all senders, kept in insertion order.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn append(&self, order: Order) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<Order>, StoreError>;
    async fn pending_for(&self, sender: &SenderId) -> Result<Vec<Order>, StoreError>;
    async fn remove(&self, id: OrderId) -> Result<Order, StoreError>;
    /// Moves a still-pending order to paid and returns the updated order.
    async fn mark_paid(&self, id: OrderId) -> Result<Order, StoreError>;
}
