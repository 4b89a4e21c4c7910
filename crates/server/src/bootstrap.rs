use std::sync::Arc;

use comanda_agent::{ConversationDeps, ConversationService, PaymentQr};
use comanda_chat::console::ConsoleTransport;
use comanda_chat::events::EventDispatcher;
use comanda_chat::runner::{ChatRunner, ChatTransport, NoopTransport, ReconnectPolicy};
use comanda_core::audit::InMemoryAuditSink;
use comanda_core::config::{AppConfig, ConfigError, LoadOptions, TransportKind};
use comanda_core::domain::catalog::Catalog;
use comanda_core::receipt::PdfTextExtractor;
use thiserror::Error;
use tracing::{info, warn};

use crate::handler::ConversationBridge;

pub struct Application {
    pub config: AppConfig,
    pub conversation: Arc<ConversationService>,
    pub audit_sink: InMemoryAuditSink,
    pub chat_runner: ChatRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn load_config(options: LoadOptions) -> Result<AppConfig, BootstrapError> {
    Ok(AppConfig::load(options)?)
}

pub fn bootstrap_with_config(config: AppConfig) -> Application {
    let transport: Arc<dyn ChatTransport> = match config.chat.transport {
        TransportKind::Console => Arc::new(ConsoleTransport::stdio()),
        TransportKind::Noop => Arc::new(NoopTransport),
    };
    bootstrap_with_transport(config, transport)
}

pub fn bootstrap_with_transport(
    config: AppConfig,
    transport: Arc<dyn ChatTransport>,
) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    if !config.chat.payment_qr_path.exists() {
        warn!(
            event_name = "system.bootstrap.payment_qr_missing",
            correlation_id = "bootstrap",
            path = %config.chat.payment_qr_path.display(),
            "payment QR image not found; checkout replies will be sent without it"
        );
    }

    let audit_sink = InMemoryAuditSink::default();
    let deps =
        ConversationDeps::in_memory_with(Arc::new(PdfTextExtractor), Arc::new(audit_sink.clone()));
    let conversation = Arc::new(ConversationService::new(
        deps,
        Catalog::default(),
        PaymentQr::from(&config.chat),
    ));

    let dispatcher = EventDispatcher::new(Arc::new(ConversationBridge::new(conversation.clone())));
    let chat_runner =
        ChatRunner::new(transport, dispatcher, ReconnectPolicy::from(&config.reconnect));

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        transport = ?config.chat.transport,
        catalog_items = conversation.catalog().items().len(),
        "conversation service and chat runner wired"
    );

    Application { config, conversation, audit_sink, chat_runner }
}
