use std::sync::Arc;

use async_trait::async_trait;
use comanda_agent::ConversationService;
use comanda_chat::events::{ConversationHandler, EventContext};
use comanda_core::domain::customer::SenderId;
use comanda_core::domain::message::{InboundEvent, OutboundMessage};

/// Hands chat events to the conversation engine, carrying the message id as correlation id.
#[derive(Clone)]
pub struct ConversationBridge {
    service: Arc<ConversationService>,
}

impl ConversationBridge {
    pub fn new(service: Arc<ConversationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ConversationHandler for ConversationBridge {
    async fn handle(
        &self,
        sender: &SenderId,
        event: InboundEvent,
        ctx: &EventContext,
    ) -> Option<OutboundMessage> {
        self.service.handle(sender, event, &ctx.correlation_id).await
    }
}
