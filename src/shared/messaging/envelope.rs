//! Outgoing message frame
//!
//! Messages are submitted over the realtime channel, not over REST. The frame
//! is a JSON object `{message, sender_id, receiver_id}`; `client_ref` is only
//! present when optimistic sending is enabled.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PeerId, UserId};
use crate::shared::error::SharedError;

/// Frame sent verbatim over the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutgoingMessageEnvelope {
    /// Message body
    pub message: String,
    pub sender_id: UserId,
    pub receiver_id: PeerId,
    /// Correlation token echoed back by servers that support it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<Uuid>,
}

impl OutgoingMessageEnvelope {
    /// Build an envelope; whitespace-only bodies are rejected
    pub fn new(
        message: impl Into<String>,
        sender_id: UserId,
        receiver_id: PeerId,
    ) -> Result<Self, SharedError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(SharedError::validation("message", "Message body cannot be empty"));
        }
        Ok(Self {
            message,
            sender_id,
            receiver_id,
            client_ref: None,
        })
    }

    /// Attach a correlation token
    pub fn with_client_ref(mut self, client_ref: Uuid) -> Self {
        self.client_ref = Some(client_ref);
        self
    }

    /// Serialize to the text frame payload
    pub fn to_frame(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
