use std::fs;
use std::path::Path;

use comanda_agent::replies;
use comanda_core::receipt::{
    read_receipt_amount, DocumentTextExtractor, PdfTextExtractor, ReceiptError,
};
use serde_json::json;

use crate::commands::CommandResult;

pub const EXIT_INPUT: u8 = 2;
pub const EXIT_EXTRACTION: u8 = 3;
pub const EXIT_AMOUNT_NOT_FOUND: u8 = 4;
pub const EXIT_RUNTIME: u8 = 5;

pub fn run(path: &Path) -> CommandResult {
    run_with_extractor(path, &PdfTextExtractor)
}

/// Reads `path`, extracts its text with `extractor` and reports the first labelled amount.
pub fn run_with_extractor<E>(path: &Path, extractor: &E) -> CommandResult
where
    E: DocumentTextExtractor + ?Sized,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            return CommandResult::failure(
                "receipt",
                "input",
                format!("could not read `{}`: {error}", path.display()),
                EXIT_INPUT,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "receipt",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    match runtime.block_on(read_receipt_amount(extractor, &bytes)) {
        Ok(amount) => CommandResult::success_with_details(
            "receipt",
            format!("amount found: R${}", replies::money(amount)),
            Some(json!({
                "path": path.display().to_string(),
                "amount": replies::money(amount),
            })),
        ),
        Err(error @ ReceiptError::Extraction(_)) => {
            CommandResult::failure("receipt", "extraction", error.to_string(), EXIT_EXTRACTION)
        }
        Err(error @ ReceiptError::AmountNotFound) => CommandResult::failure(
            "receipt",
            "amount_not_found",
            error.to_string(),
            EXIT_AMOUNT_NOT_FOUND,
        ),
    }
}
