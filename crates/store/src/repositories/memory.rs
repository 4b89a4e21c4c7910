use std::collections::HashMap;

use tokio::sync::RwLock;

use comanda_core::domain::cart::CartItem;
use comanda_core::domain::customer::{CustomerProfile, SenderId};
use comanda_core::domain::order::{Order, OrderId, OrderStatus};

use super::{CartStore, OrderLedger, ProfileStore, StoreError};

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<SenderId, CustomerProfile>>,
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find(&self, sender: &SenderId) -> Result<Option<CustomerProfile>, StoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(sender).cloned())
    }

    async fn save(&self, profile: CustomerProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.sender.clone(), profile);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<SenderId, Vec<CartItem>>>,
}

#[async_trait::async_trait]
impl CartStore for InMemoryCartStore {
    async fn items(&self, sender: &SenderId) -> Result<Vec<CartItem>, StoreError> {
        let carts = self.carts.read().await;
        Ok(carts.get(sender).cloned().unwrap_or_default())
    }

    async fn add(&self, sender: &SenderId, item: CartItem) -> Result<(), StoreError> {
        let mut carts = self.carts.write().await;
        carts.entry(sender.clone()).or_default().push(item);
        Ok(())
    }

    async fn take(&self, sender: &SenderId) -> Result<Vec<CartItem>, StoreError> {
        let mut carts = self.carts.write().await;
        Ok(carts.get_mut(sender).map(std::mem::take).unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryOrderLedger {
    orders: RwLock<Vec<Order>>,
}

#[async_trait::async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn append(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        orders.push(order);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.clone())
    }

    async fn pending_for(&self, sender: &SenderId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|order| &order.sender == sender && order.is_pending())
            .cloned()
            .collect())
    }

    async fn remove(&self, id: OrderId) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let position =
            orders.iter().position(|order| order.id == id).ok_or(StoreError::OrderNotFound(id))?;
        Ok(orders.remove(position))
    }

    async fn mark_paid(&self, id: OrderId) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order =
            orders.iter_mut().find(|order| order.id == id).ok_or(StoreError::OrderNotFound(id))?;
        order.transition_to(OrderStatus::Paid)?;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use comanda_core::domain::cart::CartItem;
    use comanda_core::domain::catalog::Catalog;
    use comanda_core::domain::customer::{CustomerProfile, SenderId};
    use comanda_core::domain::order::{Order, OrderId, OrderStatus};
    use comanda_core::errors::DomainError;
    use comanda_core::flows::ConversationStep;

    use crate::repositories::{
        CartStore, InMemoryCartStore, InMemoryOrderLedger, InMemoryProfileStore, OrderLedger,
        ProfileStore, StoreError,
    };

    fn item(code: &str) -> CartItem {
        CartItem::from(Catalog::default().find(code).expect("catalog code"))
    }

    fn order(sender: &str, codes: &[&str]) -> Order {
        Order::place(SenderId::new(sender), codes.iter().map(|code| item(code)).collect())
            .expect("order")
    }

    #[tokio::test]
    async fn profile_store_round_trip() {
        let store = InMemoryProfileStore::default();
        let sender = SenderId::new("s-1");
        assert!(store.find(&sender).await.expect("find").is_none());

        let mut profile = CustomerProfile::new(sender.clone());
        profile.name = Some("Ana".to_owned());
        profile.step = ConversationStep::AwaitingAddress;
        store.save(profile.clone()).await.expect("save");

        assert_eq!(store.find(&sender).await.expect("find"), Some(profile));
    }

    #[tokio::test]
    async fn carts_are_per_sender_and_cleared_by_take() {
        let carts = InMemoryCartStore::default();
        let ana = SenderId::new("ana");
        let bia = SenderId::new("bia");

        carts.add(&ana, item("1")).await.expect("add");
        carts.add(&ana, item("2")).await.expect("add");
        carts.add(&bia, item("2")).await.expect("add");

        let taken = carts.take(&ana).await.expect("take");
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].name, "Refeição");
        assert!(carts.items(&ana).await.expect("items").is_empty());
        assert_eq!(carts.items(&bia).await.expect("items").len(), 1);
    }

    #[tokio::test]
    async fn taking_an_unknown_cart_yields_nothing() {
        let carts = InMemoryCartStore::default();
        assert!(carts.take(&SenderId::new("nobody")).await.expect("take").is_empty());
    }

    #[tokio::test]
    async fn pending_orders_keep_ledger_order_and_skip_other_senders() {
        let ledger = InMemoryOrderLedger::default();
        let first = order("ana", &["1"]);
        let other = order("bia", &["2"]);
        let second = order("ana", &["2", "2"]);
        for entry in [first.clone(), other.clone(), second.clone()] {
            ledger.append(entry).await.expect("append");
        }

        let pending = ledger.pending_for(&SenderId::new("ana")).await.expect("pending");
        assert_eq!(pending.iter().map(|order| order.id).collect::<Vec<_>>(), vec![
            first.id, second.id
        ]);

        ledger.mark_paid(first.id).await.expect("mark paid");
        let pending = ledger.pending_for(&SenderId::new("ana")).await.expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);
        assert_eq!(ledger.list().await.expect("list").len(), 3);
    }

    #[tokio::test]
    async fn removing_an_order_leaves_the_rest_untouched() {
        let ledger = InMemoryOrderLedger::default();
        let first = order("ana", &["1"]);
        let second = order("ana", &["2"]);
        let third = order("bia", &["1", "2"]);
        for entry in [first.clone(), second.clone(), third.clone()] {
            ledger.append(entry).await.expect("append");
        }

        let removed = ledger.remove(second.id).await.expect("remove");
        assert_eq!(removed.id, second.id);

        let remaining = ledger.list().await.expect("list");
        assert_eq!(remaining, vec![first, third]);
        assert_eq!(ledger.remove(second.id).await, Err(StoreError::OrderNotFound(second.id)));
    }

    #[tokio::test]
    async fn mark_paid_rejects_orders_already_paid_or_missing() {
        let ledger = InMemoryOrderLedger::default();
        let placed = order("ana", &["1"]);
        ledger.append(placed.clone()).await.expect("append");

        let paid = ledger.mark_paid(placed.id).await.expect("first payment");
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.total, Decimal::new(2_500, 2));

        assert_eq!(
            ledger.mark_paid(placed.id).await,
            Err(StoreError::Domain(DomainError::InvalidOrderTransition {
                from: OrderStatus::Paid,
                to: OrderStatus::Paid,
            }))
        );

        let missing = OrderId::new();
        assert_eq!(ledger.mark_paid(missing).await, Err(StoreError::OrderNotFound(missing)));
    }
}
