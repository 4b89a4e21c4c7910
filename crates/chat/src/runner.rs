use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use comanda_core::config::ReconnectConfig;
use comanda_core::domain::customer::SenderId;
use comanda_core::domain::message::OutboundMessage;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{EventContext, EventDispatcher, HandlerResult, InboundEnvelope};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport send failed: {0}")]
    Send(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_envelope(&self) -> Result<Option<InboundEnvelope>, TransportError>;
    async fn send_text(&self, recipient: &SenderId, text: &str) -> Result<(), TransportError>;
    async fn send_image(
        &self,
        recipient: &SenderId,
        path: &Path,
        caption: &str,
    ) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Default)]
pub struct NoopTransport;

#[async_trait]
impl ChatTransport for NoopTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<InboundEnvelope>, TransportError> {
        Ok(None)
    }

    async fn send_text(&self, _recipient: &SenderId, _text: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_image(
        &self,
        _recipient: &SenderId,
        _path: &Path,
        _caption: &str,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentOutcome {
    NotRequested,
    Sent,
    SkippedMissingAsset,
}

/// Sends the reply text, then its image attachment when the asset exists on disk.
///
/// A missing asset is not an error. A transport failure while sending an existing asset is.
pub async fn deliver(
    transport: &dyn ChatTransport,
    recipient: &SenderId,
    message: &OutboundMessage,
) -> Result<AttachmentOutcome, TransportError> {
    if !message.text.is_empty() {
        transport.send_text(recipient, &message.text).await?;
    }

    let Some(attachment) = &message.attachment else {
        return Ok(AttachmentOutcome::NotRequested);
    };

    if !attachment.path.exists() {
        debug!(
            event_name = "egress.chat.attachment_skipped",
            sender = %recipient,
            path = %attachment.path.display(),
            "attachment asset not found; sending text only"
        );
        return Ok(AttachmentOutcome::SkippedMissingAsset);
    }

    transport.send_image(recipient, &attachment.path, &attachment.caption).await?;
    Ok(AttachmentOutcome::Sent)
}

pub struct ChatRunner {
    transport: Arc<dyn ChatTransport>,
    dispatcher: EventDispatcher,
    reconnect_policy: ReconnectPolicy,
}

impl Default for ChatRunner {
    fn default() -> Self {
        Self {
            transport: Arc::new(NoopTransport),
            dispatcher: EventDispatcher::default(),
            reconnect_policy: ReconnectPolicy::default(),
        }
    }
}

impl ChatRunner {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, dispatcher, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "chat transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "chat transport retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), TransportError> {
        info!(attempt, "opening chat transport connection");
        self.transport.connect().await?;
        info!(attempt, "chat transport connected");

        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                info!(attempt, "chat transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            info!(
                event_name = "ingress.chat.message_received",
                message_id = %envelope.message_id,
                correlation_id = %envelope.message_id,
                sender = %envelope.sender,
                payload_kind = ?envelope.payload.kind(),
                from_self = envelope.from_self,
                "received chat message"
            );

            let context = EventContext { correlation_id: envelope.message_id.clone() };
            let HandlerResult::Responded(message) =
                self.dispatcher.dispatch(&envelope, &context).await
            else {
                continue;
            };

            match deliver(self.transport.as_ref(), &envelope.sender, &message).await {
                Ok(attachment) => debug!(
                    event_name = "egress.chat.reply_sent",
                    correlation_id = %envelope.message_id,
                    sender = %envelope.sender,
                    attachment = ?attachment,
                    "reply delivered"
                ),
                Err(error) => warn!(
                    event_name = "egress.chat.reply_failed",
                    correlation_id = %envelope.message_id,
                    sender = %envelope.sender,
                    error = %error,
                    "reply delivery failed; not retried"
                ),
            }
        }
    }
}
