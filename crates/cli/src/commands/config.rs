use std::env;
use std::fs;
use std::path::Path;

use comanda_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

/// One reported setting: its dotted key, rendered value and the env vars that can set it.
struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key: "chat.transport",
            value: format!("{:?}", config.chat.transport),
            env_keys: &["COMANDA_CHAT_TRANSPORT"],
        },
        Field {
            key: "chat.payment_qr_path",
            value: config.chat.payment_qr_path.display().to_string(),
            env_keys: &["COMANDA_CHAT_PAYMENT_QR_PATH"],
        },
        Field {
            key: "chat.payment_qr_caption",
            value: config.chat.payment_qr_caption.clone(),
            env_keys: &["COMANDA_CHAT_PAYMENT_QR_CAPTION"],
        },
        Field {
            key: "reconnect.max_retries",
            value: config.reconnect.max_retries.to_string(),
            env_keys: &["COMANDA_RECONNECT_MAX_RETRIES"],
        },
        Field {
            key: "reconnect.base_delay_ms",
            value: config.reconnect.base_delay_ms.to_string(),
            env_keys: &["COMANDA_RECONNECT_BASE_DELAY_MS"],
        },
        Field {
            key: "reconnect.max_delay_ms",
            value: config.reconnect.max_delay_ms.to_string(),
            env_keys: &["COMANDA_RECONNECT_MAX_DELAY_MS"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["COMANDA_LOGGING_LEVEL", "COMANDA_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["COMANDA_LOGGING_FORMAT", "COMANDA_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let set_env_key = env_keys
        .iter()
        .find(|env_key| env::var(env_key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = set_env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
