//! Payment receipt reading: document text extraction followed by amount parsing.

pub mod amount;
pub mod extract;

use rust_decimal::Decimal;
use thiserror::Error;

pub use amount::parse_amount;
pub use extract::{DocumentTextExtractor, PdfTextExtractor};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("could not extract text from document: {0}")]
    Extraction(String),
    #[error("no labelled amount found in document text")]
    AmountNotFound,
}

/// Runs `extractor` over `payload` and parses the first labelled amount out of the text.
pub async fn read_receipt_amount<E>(extractor: &E, payload: &[u8]) -> Result<Decimal, ReceiptError>
where
    E: DocumentTextExtractor + ?Sized,
{
    let text = extractor.extract(payload).await?;
    parse_amount(&text).ok_or(ReceiptError::AmountNotFound)
}
