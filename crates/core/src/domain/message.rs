use std::path::PathBuf;

use serde::Serialize;

/// Normalized content of one inbound chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    Text(String),
    Document(Vec<u8>),
    /// A document was sent but its bytes could not be fetched.
    DocumentUnavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageAttachment {
    pub path: PathBuf,
    pub caption: String,
}

/// Reply produced for one inbound event: a text and, at most, one image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<ImageAttachment>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), attachment: None }
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>, caption: impl Into<String>) -> Self {
        self.attachment = Some(ImageAttachment { path: path.into(), caption: caption.into() });
        self
    }
}
