use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::SenderId;
use crate::domain::order::OrderId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditCategory {
    Flow,
    Cart,
    Order,
    Payment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Success,
    Rejected,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
    pub sender: SenderId,
    pub correlation_id: String,
    pub actor: String,
}

impl AuditContext {
    pub fn new(
        sender: SenderId,
        correlation_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self { sender, correlation_id: correlation_id.into(), actor: actor.into() }
    }

    pub fn event(
        &self,
        event_type: impl Into<String>,
        category: AuditCategory,
        outcome: AuditOutcome,
    ) -> AuditEvent {
        AuditEvent::new(
            self.sender.clone(),
            self.correlation_id.clone(),
            event_type,
            category,
            self.actor.clone(),
            outcome,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub sender: SenderId,
    pub order_id: Option<OrderId>,
    pub correlation_id: String,
    pub event_type: String,
    pub category: AuditCategory,
    pub actor: String,
    pub outcome: AuditOutcome,
    pub metadata: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        sender: SenderId,
        correlation_id: impl Into<String>,
        event_type: impl Into<String>,
        category: AuditCategory,
        actor: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            sender,
            order_id: None,
            correlation_id: correlation_id.into(),
            event_type: event_type.into(),
            category,
            actor: actor.into(),
            outcome,
            metadata: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn for_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<AuditEvent> {
        self.events().into_iter().filter(|event| event.event_type == event_type).collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        audit::{AuditCategory, AuditContext, AuditOutcome, AuditSink, InMemoryAuditSink},
        domain::{customer::SenderId, order::OrderId},
    };

    #[test]
    fn in_memory_sink_records_events_with_correlation_fields() {
        let sink = InMemoryAuditSink::default();
        let order_id = OrderId::new();
        let context = AuditContext::new(SenderId::new("s-42"), "msg-123", "conversation");

        sink.emit(
            context
                .event("order.placed", AuditCategory::Order, AuditOutcome::Success)
                .for_order(order_id)
                .with_metadata("total", "55.00"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, "msg-123");
        assert_eq!(events[0].sender.as_str(), "s-42");
        assert_eq!(events[0].order_id, Some(order_id));
        assert_eq!(events[0].metadata.get("total").map(String::as_str), Some("55.00"));
        assert_eq!(sink.events_of_type("order.placed").len(), 1);
        assert!(sink.events_of_type("order.paid").is_empty());
    }

    #[test]
    fn events_serialize_for_export() {
        let context = AuditContext::new(SenderId::new("s-1"), "msg-1", "conversation");
        let event = context
            .event("payment.rejected", AuditCategory::Payment, AuditOutcome::Rejected)
            .with_metadata("paid", "25.01");

        let json = serde_json::to_value(&event).expect("serialize audit event");

        assert_eq!(json["event_type"], "payment.rejected");
        assert_eq!(json["category"], "Payment");
        assert_eq!(json["outcome"], "Rejected");
        assert_eq!(json["sender"], "s-1");
        assert_eq!(json["metadata"]["paid"], "25.01");
        assert!(json["order_id"].is_null());
    }
}
