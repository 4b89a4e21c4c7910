use std::sync::Arc;

use async_trait::async_trait;

use comanda_core::domain::customer::SenderId;
use comanda_core::domain::message::{InboundEvent, OutboundMessage};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEnvelope {
    pub message_id: String,
    pub sender: SenderId,
    pub from_self: bool,
    pub payload: InboundPayload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundPayload {
    Text(String),
    Document { file_name: Option<String>, bytes: Vec<u8> },
    UnreadableDocument { reason: String },
    Unsupported { kind: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Text,
    Document,
    UnreadableDocument,
    Unsupported,
}

impl InboundPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Text(_) => PayloadKind::Text,
            Self::Document { .. } => PayloadKind::Document,
            Self::UnreadableDocument { .. } => PayloadKind::UnreadableDocument,
            Self::Unsupported { .. } => PayloadKind::Unsupported,
        }
    }
}

impl InboundEnvelope {
    pub fn text(
        message_id: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            sender: SenderId::new(sender),
            from_self: false,
            payload: InboundPayload::Text(text.into()),
        }
    }

    pub fn document(
        message_id: impl Into<String>,
        sender: impl Into<String>,
        file_name: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            sender: SenderId::new(sender),
            from_self: false,
            payload: InboundPayload::Document { file_name, bytes },
        }
    }

    /// The conversation-level event carried by this envelope. Unsupported media
    /// reaches the conversation as empty text.
    pub fn event(&self) -> InboundEvent {
        match &self.payload {
            InboundPayload::Text(text) => InboundEvent::Text(text.clone()),
            InboundPayload::Document { bytes, .. } => InboundEvent::Document(bytes.clone()),
            InboundPayload::UnreadableDocument { .. } => InboundEvent::DocumentUnavailable,
            InboundPayload::Unsupported { .. } => InboundEvent::Text(String::new()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(OutboundMessage),
    Processed,
    Ignored,
}

#[async_trait]
pub trait ConversationHandler: Send + Sync {
    async fn handle(
        &self,
        sender: &SenderId,
        event: InboundEvent,
        ctx: &EventContext,
    ) -> Option<OutboundMessage>;
}

/// Drops the bot's own messages and forwards everything else.
#[derive(Clone)]
pub struct EventDispatcher {
    handler: Arc<dyn ConversationHandler>,
}

impl EventDispatcher {
    pub fn new(handler: Arc<dyn ConversationHandler>) -> Self {
        Self { handler }
    }

    pub async fn dispatch(&self, envelope: &InboundEnvelope, ctx: &EventContext) -> HandlerResult {
        if envelope.from_self {
            return HandlerResult::Ignored;
        }

        match self.handler.handle(&envelope.sender, envelope.event(), ctx).await {
            Some(message) => HandlerResult::Responded(message),
            None => HandlerResult::Processed,
        }
    }
}

/// Handler that never replies; used where no conversation is wired in.
#[derive(Default)]
pub struct SilentHandler;

#[async_trait]
impl ConversationHandler for SilentHandler {
    async fn handle(
        &self,
        _sender: &SenderId,
        _event: InboundEvent,
        _ctx: &EventContext,
    ) -> Option<OutboundMessage> {
        None
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(SilentHandler))
    }
}
