//! Line-oriented transport for local runs.
//!
//! Input lines take the form `@sender text`; a bare line is attributed to `console`.
//! `/pdf <path>` (optionally prefixed by `@sender`) submits the file at `path` as a document.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use comanda_core::domain::customer::SenderId;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::events::{InboundEnvelope, InboundPayload};
use crate::runner::{ChatTransport, TransportError};

pub const DEFAULT_CONSOLE_SENDER: &str = "console";

pub struct ConsoleTransport<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
    sequence: AtomicU64,
}

impl ConsoleTransport<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader: Mutex::new(reader), writer: Mutex::new(writer), sequence: AtomicU64::new(0) }
    }

    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    async fn write_line(&self, line: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|error| TransportError::Send(error.to_string()))?;
        writer.write_all(b"\n").await.map_err(|error| TransportError::Send(error.to_string()))?;
        writer.flush().await.map_err(|error| TransportError::Send(error.to_string()))
    }

    async fn envelope_from_line(&self, line: &str) -> InboundEnvelope {
        let message_id = format!("console-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let (sender, body) = split_sender(line);

        let payload = match body.strip_prefix("/pdf ") {
            Some(path) => read_document(path.trim()).await,
            None => InboundPayload::Text(body.to_owned()),
        };

        InboundEnvelope { message_id, sender: SenderId::new(sender), from_self: false, payload }
    }
}

fn split_sender(line: &str) -> (&str, &str) {
    if let Some(rest) = line.strip_prefix('@') {
        if let Some((sender, body)) = rest.split_once(char::is_whitespace) {
            if !sender.is_empty() {
                return (sender, body.trim_start());
            }
        }
    }
    (DEFAULT_CONSOLE_SENDER, line)
}

async fn read_document(path: &str) -> InboundPayload {
    match tokio::fs::read(path).await {
        Ok(bytes) => InboundPayload::Document {
            file_name: Path::new(path).file_name().map(|name| name.to_string_lossy().into_owned()),
            bytes,
        },
        Err(error) => {
            warn!(
                event_name = "ingress.console.document_unreadable",
                path,
                error = %error,
                "could not read document for console submission"
            );
            InboundPayload::UnreadableDocument { reason: error.to_string() }
        }
    }
}

#[async_trait]
impl<R, W> ChatTransport for ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<InboundEnvelope>, TransportError> {
        loop {
            let mut line = String::new();
            let read = {
                let mut reader = self.reader.lock().await;
                reader
                    .read_line(&mut line)
                    .await
                    .map_err(|error| TransportError::Receive(error.to_string()))?
            };
            if read == 0 {
                return Ok(None);
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(Some(self.envelope_from_line(line).await));
        }
    }

    async fn send_text(&self, recipient: &SenderId, text: &str) -> Result<(), TransportError> {
        self.write_line(&format!("[{recipient}] {text}")).await
    }

    async fn send_image(
        &self,
        recipient: &SenderId,
        path: &Path,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.write_line(&format!("[{recipient}] <imagem {}> {caption}", path.display())).await
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.flush().await.map_err(|error| TransportError::Disconnect(error.to_string()))
    }
}
