//! Chat Message Data Structure
//!
//! Represents a message in a one-to-one conversation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PeerId, UserId};

/// A message as returned by the directory API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    /// Message body
    #[serde(default, rename = "message")]
    pub body: String,
    /// Display timestamp; some endpoints send `time`, others `datetime`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    /// Whether the receiver has read the message
    #[serde(default)]
    pub read: bool,
    /// Correlation token of the envelope this message was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<Uuid>,
}

impl ChatMessage {
    /// Create a text message (used for optimistic entries and tests)
    pub fn new_text(sender_id: UserId, receiver_id: UserId, body: impl Into<String>) -> Self {
        Self {
            sender_id,
            receiver_id,
            body: body.into(),
            time: None,
            datetime: Some(chrono::Utc::now().to_rfc3339()),
            read: false,
            client_ref: None,
        }
    }

    /// The raw timestamp to display: `time`, falling back to `datetime`
    pub fn timestamp_raw(&self) -> Option<&str> {
        self.time
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.datetime.as_deref().filter(|t| !t.is_empty()))
    }

    /// Whether the message was exchanged with `peer`
    pub fn involves(&self, peer: PeerId) -> bool {
        self.sender_id == peer || self.receiver_id == peer
    }
}

/// Response of `GET /chats/{peer}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationResponse {
    pub status: bool,
    /// Display name of the peer
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}
