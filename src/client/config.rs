use std::time::Duration;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};
use crate::shared::messaging::{PeerId, UserId};

/// Client configuration wrapper.
///
/// Resolves endpoint URLs and carries the session token, which may change
/// at runtime (login/logout) independently of the loaded `AppConfig`.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
    token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_app(AppConfig::default())
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_app(app: AppConfig) -> Self {
        let token = app.token.clone();
        Self { app, token }
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::from_app(builder.build()?))
    }

    /// Defaults, config file and `CHAT_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::from_app(AppConfig::load()?))
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Set the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the bearer token
    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.app.api_url, path)
    }

    /// `GET` endpoint of the conversation list
    pub fn conversations_url(&self) -> String {
        self.api_url("/chats")
    }

    /// `GET` endpoint of one conversation
    pub fn conversation_url(&self, peer: PeerId) -> String {
        self.api_url(&format!("/chats/{}", peer))
    }

    pub fn ws_url(&self) -> &str {
        &self.app.ws_url
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.app.user_id
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout
    }

    pub fn send_timeout(&self) -> Duration {
        self.app.send_timeout
    }
}
