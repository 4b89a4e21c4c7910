use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use comanda_cli::commands::{catalog, config, receipt};
use comanda_core::receipt::{DocumentTextExtractor, ReceiptError};
use serde_json::Value;

/// Stands in for a PDF decoder: the file bytes are the text layer.
struct PlainTextExtractor;

#[async_trait]
impl DocumentTextExtractor for PlainTextExtractor {
    async fn extract(&self, payload: &[u8]) -> Result<String, ReceiptError> {
        String::from_utf8(payload.to_vec())
            .map_err(|error| ReceiptError::Extraction(error.to_string()))
    }
}

struct BrokenExtractor;

#[async_trait]
impl DocumentTextExtractor for BrokenExtractor {
    async fn extract(&self, _payload: &[u8]) -> Result<String, ReceiptError> {
        Err(ReceiptError::Extraction("encrypted document".to_string()))
    }
}

#[test]
fn catalog_lists_items_and_menu_text() {
    let result = catalog::run();
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "catalog");
    assert_eq!(payload["status"], "ok");
    assert!(payload["message"].as_str().unwrap_or_default().contains("1. Refeição - R$25,00"));
    assert_eq!(payload["details"]["items"][1]["name"], "Bebida");
    assert_eq!(payload["details"]["items"][1]["unit_price"], "5.00");
}

#[test]
fn receipt_reports_labelled_amount() {
    let file = write_fixture(b"Comprovante de transferencia PIX\nValor: R$ 1.234,56\nBanco X");

    let result = receipt::run_with_extractor(file.path(), &PlainTextExtractor);
    assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "receipt");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["amount"], "1234.56");
}

#[test]
fn receipt_without_label_exits_with_amount_not_found() {
    let file = write_fixture(b"Pix enviado 25,00");

    let result = receipt::run_with_extractor(file.path(), &PlainTextExtractor);
    assert_eq!(result.exit_code, receipt::EXIT_AMOUNT_NOT_FOUND);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "amount_not_found");
}

#[test]
fn receipt_that_is_not_a_pdf_exits_with_extraction_failure() {
    let file = write_fixture(b"definitely not a pdf document");

    let result = receipt::run(file.path());
    assert_eq!(result.exit_code, receipt::EXIT_EXTRACTION);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "extraction");
}

#[test]
fn receipt_extractor_errors_map_to_extraction_exit_code() {
    let file = write_fixture(b"Valor: R$ 25,00");

    let result = receipt::run_with_extractor(file.path(), &BrokenExtractor);
    assert_eq!(result.exit_code, receipt::EXIT_EXTRACTION);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "extraction");
    assert!(payload["message"].as_str().unwrap_or_default().contains("encrypted document"));
}

#[test]
fn receipt_missing_file_is_an_input_error() {
    let result = receipt::run(Path::new("/definitely/not/here/comprovante.pdf"));
    assert_eq!(result.exit_code, receipt::EXIT_INPUT);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "input");
}

#[test]
fn config_reports_defaults_and_env_sources() {
    with_env(&[("COMANDA_CHAT_TRANSPORT", "noop"), ("COMANDA_LOG_LEVEL", "debug")], || {
        let output = config::run();

        assert!(output.starts_with("effective config"));
        assert!(output.contains("- chat.transport = Noop (source: env (COMANDA_CHAT_TRANSPORT))"));
        assert!(output.contains("- logging.level = debug (source: env (COMANDA_LOG_LEVEL))"));
        assert!(output.contains("- reconnect.max_retries = 5 (source: default)"));
        assert!(output.contains(
            "- chat.payment_qr_path = img_qrcode/QRCodeRestaurante.jpg (source: default)"
        ));
    });
}

#[test]
fn config_reports_validation_failures() {
    with_env(&[("COMANDA_LOGGING_LEVEL", "chatty")], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed"), "unexpected: {output}");
    });
}

fn write_fixture(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents).expect("write fixture");
    file
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "COMANDA_CHAT_TRANSPORT",
        "COMANDA_CHAT_PAYMENT_QR_PATH",
        "COMANDA_CHAT_PAYMENT_QR_CAPTION",
        "COMANDA_RECONNECT_MAX_RETRIES",
        "COMANDA_RECONNECT_BASE_DELAY_MS",
        "COMANDA_RECONNECT_MAX_DELAY_MS",
        "COMANDA_LOGGING_LEVEL",
        "COMANDA_LOGGING_FORMAT",
        "COMANDA_LOG_LEVEL",
        "COMANDA_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
