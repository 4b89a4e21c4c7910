mod bootstrap;
mod handler;

use anyhow::Result;
use comanda_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use comanda_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging must be up before bootstrap emits anything.
    let config = bootstrap::load_config(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config);

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        transport = ?app.config.chat.transport,
        payment_qr_path = %app.config.chat.payment_qr_path.display(),
        catalog_items = app.conversation.catalog().items().len(),
        "comanda-server started; waiting for messages"
    );
    app.chat_runner.start().await?;

    tracing::info!(
        event_name = "system.server.transport_closed",
        correlation_id = "shutdown",
        audit_events = app.audit_sink.events().len(),
        "chat transport closed; press ctrl-c to exit"
    );
    wait_for_shutdown().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "comanda-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
