use async_trait::async_trait;
use tracing::{debug, warn};

use crate::receipt::ReceiptError;

#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    async fn extract(&self, payload: &[u8]) -> Result<String, ReceiptError>;
}

/// Reads the text layer of a PDF receipt.
///
/// Decoding runs on the blocking pool, so a decoder panic on a malformed file comes back as
/// [`ReceiptError::Extraction`] instead of unwinding through the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentTextExtractor for PdfTextExtractor {
    async fn extract(&self, payload: &[u8]) -> Result<String, ReceiptError> {
        let bytes = payload.to_vec();
        let byte_len = bytes.len();

        let decoded = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|error| error.to_string())
        })
        .await
        .map_err(|join_error| {
            warn!(error = %join_error, byte_len, "pdf decoder aborted");
            ReceiptError::Extraction(format!("pdf decoder aborted: {join_error}"))
        })?
        .map_err(|message| {
            warn!(error = %message, byte_len, "pdf decoding failed");
            ReceiptError::Extraction(message)
        })?;

        let text = normalize_text(&decoded);
        if text.is_empty() {
            return Err(ReceiptError::Extraction("document has no text layer".to_owned()));
        }

        debug!(byte_len, text_len = text.len(), "pdf text extracted");
        Ok(text)
    }
}

/// Collapses every whitespace run, line breaks included, into one space and trims the ends.
pub(crate) fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{normalize_text, DocumentTextExtractor, PdfTextExtractor};
    use crate::receipt::ReceiptError;

    #[test]
    fn whitespace_runs_and_line_breaks_collapse() {
        assert_eq!(
            normalize_text("  Comprovante\r\n\r\nValor:\t R$\u{a0}25,00 \n"),
            "Comprovante Valor: R$ 25,00"
        );
    }

    #[test]
    fn blank_text_normalizes_to_empty() {
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[tokio::test]
    async fn undecodable_payload_is_an_extraction_failure() {
        let result = PdfTextExtractor.extract(b"definitely not a pdf").await;
        assert!(matches!(result, Err(ReceiptError::Extraction(_))));
    }

    #[tokio::test]
    async fn empty_payload_is_an_extraction_failure() {
        let result = PdfTextExtractor.extract(&[]).await;
        assert!(matches!(result, Err(ReceiptError::Extraction(_))));
    }
}
