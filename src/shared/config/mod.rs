//! Application configuration module
//!
//! `AppConfig` holds everything the sync layer needs to reach the chat
//! backend: the REST base URL, the realtime endpoint, the signed-in user and
//! the tuning knobs for timeouts, retries and optimistic sends.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables (`CHAT_API_URL`, `CHAT_WS_URL`, `CHAT_TOKEN`,
//! `CHAT_USER_ID`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default REST base URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
/// Default realtime endpoint
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8000/ws/chat";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// REST base URL, e.g. `https://example.org/api`
    pub api_url: String,
    /// WebSocket endpoint shared by all screens
    pub ws_url: String,
    /// Bearer token for the REST API
    pub token: Option<String>,
    /// Id of the signed-in user, used as `sender_id`
    pub user_id: Option<u64>,
    /// Per-request timeout for REST calls
    pub request_timeout: Duration,
    /// How long a realtime send may wait for the outbound queue
    pub send_timeout: Duration,
    /// Attempts per REST refresh (1 = no retry)
    pub refresh_attempts: u32,
    /// Show outgoing messages before the server echoes them
    pub optimistic_send: bool,
    /// Apply typed realtime events incrementally instead of refetching
    pub typed_events: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            token: None,
            user_id: None,
            request_timeout: Duration::from_secs(15),
            send_timeout: Duration::from_secs(5),
            refresh_attempts: 3,
            optimistic_send: false,
            typed_events: false,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_scheme(&self.api_url, &["http", "https"])?;
        check_scheme(&self.ws_url, &["ws", "wss"])?;
        if self.refresh_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_attempts",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Default location of the config file (`<config dir>/chatsync/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatsync").join("config.toml"))
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(source)?;
        file.apply(AppConfig::builder()).build()
    }

    /// Load a TOML file on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Defaults, then the default config file if present, then env vars
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = match Self::default_path() {
            Some(path) if path.exists() => {
                let source = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                let file: FileConfig = toml::from_str(&source)?;
                file.apply(AppConfig::builder())
            }
            _ => AppConfig::builder(),
        };
        builder = builder.with_env()?;
        builder.build()
    }
}

fn check_scheme(url: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.to_string()))?;
    if allowed.contains(&parsed.scheme()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl(url.to_string()))
    }
}

/// On-disk representation; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    ws_url: Option<String>,
    token: Option<String>,
    user_id: Option<u64>,
    request_timeout_secs: Option<u64>,
    send_timeout_secs: Option<u64>,
    refresh_attempts: Option<u32>,
    optimistic_send: Option<bool>,
    typed_events: Option<bool>,
}

impl FileConfig {
    fn apply(self, mut builder: AppConfigBuilder) -> AppConfigBuilder {
        if let Some(url) = self.api_url {
            builder = builder.api_url(url);
        }
        if let Some(url) = self.ws_url {
            builder = builder.ws_url(url);
        }
        if let Some(token) = self.token {
            builder = builder.token(token);
        }
        if let Some(id) = self.user_id {
            builder = builder.user_id(id);
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.send_timeout_secs {
            builder = builder.send_timeout(Duration::from_secs(secs));
        }
        if let Some(attempts) = self.refresh_attempts {
            builder = builder.refresh_attempts(attempts);
        }
        if let Some(flag) = self.optimistic_send {
            builder = builder.optimistic_send(flag);
        }
        if let Some(flag) = self.typed_events {
            builder = builder.typed_events(flag);
        }
        builder
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_url: Option<String>,
    ws_url: Option<String>,
    token: Option<String>,
    user_id: Option<u64>,
    request_timeout: Option<Duration>,
    send_timeout: Option<Duration>,
    refresh_attempts: Option<u32>,
    optimistic_send: Option<bool>,
    typed_events: Option<bool>,
}

impl AppConfigBuilder {
    /// Set the REST base URL (a trailing slash is stripped)
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Set the realtime endpoint
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn user_id(mut self, id: u64) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn refresh_attempts(mut self, attempts: u32) -> Self {
        self.refresh_attempts = Some(attempts);
        self
    }

    pub fn optimistic_send(mut self, enabled: bool) -> Self {
        self.optimistic_send = Some(enabled);
        self
    }

    pub fn typed_events(mut self, enabled: bool) -> Self {
        self.typed_events = Some(enabled);
        self
    }

    /// Overlay `CHAT_*` environment variables
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("CHAT_API_URL") {
            self = self.api_url(url);
        }
        if let Ok(url) = std::env::var("CHAT_WS_URL") {
            self = self.ws_url(url);
        }
        if let Ok(token) = std::env::var("CHAT_TOKEN") {
            self = self.token(token);
        }
        if let Ok(raw) = std::env::var("CHAT_USER_ID") {
            let id = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                field: "CHAT_USER_ID",
                message: format!("'{}' is not a numeric user id", raw),
            })?;
            self = self.user_id(id);
        }
        Ok(self)
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_url: self.api_url.unwrap_or(defaults.api_url),
            ws_url: self.ws_url.unwrap_or(defaults.ws_url),
            token: self.token.filter(|t| !t.is_empty()),
            user_id: self.user_id,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            send_timeout: self.send_timeout.unwrap_or(defaults.send_timeout),
            refresh_attempts: self.refresh_attempts.unwrap_or(defaults.refresh_attempts),
            optimistic_send: self.optimistic_send.unwrap_or(defaults.optimistic_send),
            typed_events: self.typed_events.unwrap_or(defaults.typed_events),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("malformed config file: {0}")]
    Parse(#[from] toml::de::Error),
}
