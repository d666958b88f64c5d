//! Chat Directory API Client
//!
//! Read side of the chat backend: the conversation list and the message
//! history of one conversation. Both endpoints answer with a `status` flag;
//! `status: false` is reported as [`DirectoryError::Rejected`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::client::config::Config;
use crate::client::error::DirectoryError;
use crate::shared::messaging::{Conversation, ConversationResponse, ListConversationsResponse, PeerId};

/// The REST source of truth the sync components refresh from
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    /// All conversations of the signed-in user, in server order
    async fn list_conversations(&self) -> Result<Vec<Conversation>, DirectoryError>;

    /// Peer metadata and the full message history with `peer`
    async fn get_conversation(&self, peer: PeerId) -> Result<ConversationResponse, DirectoryError>;
}

/// `reqwest` implementation of [`ChatDirectory`]
#[derive(Debug, Clone)]
pub struct HttpChatDirectory {
    config: Config,
    client: Client,
}

impl HttpChatDirectory {
    pub fn new(config: Config) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DirectoryError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DirectoryError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = self.config.get_token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            tracing::warn!("[DIRECTORY] GET {} failed: {} - {}", url, status, error_text);
            return Err(match status.as_u16() {
                401 | 403 => DirectoryError::Unauthenticated,
                code => DirectoryError::Http { status: code },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatDirectory for HttpChatDirectory {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, DirectoryError> {
        let url = self.config.conversations_url();
        let response: ListConversationsResponse = self.get_json(&url).await?;
        if !response.status {
            return Err(DirectoryError::Rejected);
        }
        tracing::debug!("[DIRECTORY] {} conversations", response.data.len());
        Ok(response.data)
    }

    async fn get_conversation(&self, peer: PeerId) -> Result<ConversationResponse, DirectoryError> {
        let url = self.config.conversation_url(peer);
        let response: ConversationResponse = self.get_json(&url).await?;
        if !response.status {
            return Err(DirectoryError::Rejected);
        }
        tracing::debug!("[DIRECTORY] peer {}: {} messages", peer, response.messages.len());
        Ok(response)
    }
}
