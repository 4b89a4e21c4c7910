use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chat: ChatConfig,
    pub reconnect: ReconnectConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub transport: TransportKind,
    pub payment_qr_path: PathBuf,
    pub payment_qr_caption: String,
}

#[derive(Clone, Debug)]
pub struct ReconnectConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Console,
    Noop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub transport: Option<TransportKind>,
    pub payment_qr_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub reconnect_max_retries: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_PAYMENT_QR_PATH: &str = "img_qrcode/QRCodeRestaurante.jpg";
pub const DEFAULT_PAYMENT_QR_CAPTION: &str = "QR Code para pagamento via PIX.";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat: ChatConfig {
                transport: TransportKind::Console,
                payment_qr_path: PathBuf::from(DEFAULT_PAYMENT_QR_PATH),
                payment_qr_caption: DEFAULT_PAYMENT_QR_CAPTION.to_string(),
            },
            reconnect: ReconnectConfig { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "noop" => Ok(Self::Noop),
            other => Err(ConfigError::Validation(format!(
                "unsupported chat transport `{other}` (expected console|noop)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("comanda.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(chat) = patch.chat {
            if let Some(transport) = chat.transport {
                self.chat.transport = transport;
            }
            if let Some(payment_qr_path) = chat.payment_qr_path {
                self.chat.payment_qr_path = payment_qr_path;
            }
            if let Some(payment_qr_caption) = chat.payment_qr_caption {
                self.chat.payment_qr_caption = payment_qr_caption;
            }
        }

        if let Some(reconnect) = patch.reconnect {
            if let Some(max_retries) = reconnect.max_retries {
                self.reconnect.max_retries = max_retries;
            }
            if let Some(base_delay_ms) = reconnect.base_delay_ms {
                self.reconnect.base_delay_ms = base_delay_ms;
            }
            if let Some(max_delay_ms) = reconnect.max_delay_ms {
                self.reconnect.max_delay_ms = max_delay_ms;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("COMANDA_CHAT_TRANSPORT") {
            self.chat.transport = value.parse()?;
        }
        if let Some(value) = read_env("COMANDA_CHAT_PAYMENT_QR_PATH") {
            self.chat.payment_qr_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("COMANDA_CHAT_PAYMENT_QR_CAPTION") {
            self.chat.payment_qr_caption = value;
        }

        if let Some(value) = read_env("COMANDA_RECONNECT_MAX_RETRIES") {
            self.reconnect.max_retries = parse_u32("COMANDA_RECONNECT_MAX_RETRIES", &value)?;
        }
        if let Some(value) = read_env("COMANDA_RECONNECT_BASE_DELAY_MS") {
            self.reconnect.base_delay_ms = parse_u64("COMANDA_RECONNECT_BASE_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("COMANDA_RECONNECT_MAX_DELAY_MS") {
            self.reconnect.max_delay_ms = parse_u64("COMANDA_RECONNECT_MAX_DELAY_MS", &value)?;
        }

        let log_level =
            read_env("COMANDA_LOGGING_LEVEL").or_else(|| read_env("COMANDA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("COMANDA_LOGGING_FORMAT").or_else(|| read_env("COMANDA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(transport) = overrides.transport {
            self.chat.transport = transport;
        }
        if let Some(payment_qr_path) = overrides.payment_qr_path {
            self.chat.payment_qr_path = payment_qr_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(max_retries) = overrides.reconnect_max_retries {
            self.reconnect.max_retries = max_retries;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_chat(&self.chat)?;
        validate_reconnect(&self.reconnect)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file locations probed when no explicit path is given, in order.
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["comanda.toml", "config/comanda.toml"];

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_chat(chat: &ChatConfig) -> Result<(), ConfigError> {
    if chat.payment_qr_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "chat.payment_qr_path must not be empty".to_string(),
        ));
    }

    if chat.payment_qr_caption.trim().is_empty() {
        return Err(ConfigError::Validation(
            "chat.payment_qr_caption must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_reconnect(reconnect: &ReconnectConfig) -> Result<(), ConfigError> {
    if reconnect.max_delay_ms < reconnect.base_delay_ms {
        return Err(ConfigError::Validation(
            "reconnect.max_delay_ms must be greater than or equal to reconnect.base_delay_ms"
                .to_string(),
        ));
    }

    if reconnect.max_delay_ms > 300_000 {
        return Err(ConfigError::Validation(
            "reconnect.max_delay_ms must be at most 300000".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    chat: Option<ChatPatch>,
    reconnect: Option<ReconnectPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatPatch {
    transport: Option<TransportKind>,
    payment_qr_path: Option<PathBuf>,
    payment_qr_caption: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReconnectPatch {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
