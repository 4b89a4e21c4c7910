use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::{cart_total, CartItem};
use crate::domain::customer::SenderId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub sender: SenderId,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Places a pending order from a drained cart. The total is fixed here.
    pub fn place(sender: SenderId, items: Vec<CartItem>) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::InvariantViolation(
                "an order needs at least one item".to_owned(),
            ));
        }

        let total = cart_total(&items);
        Ok(Self {
            id: OrderId::new(),
            sender,
            items,
            total,
            status: OrderStatus::Pending,
            placed_at: Utc::now(),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!((self.status, next), (OrderStatus::Pending, OrderStatus::Paid))
    }

    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidOrderTransition { from: self.status, to: next })
    }
}
