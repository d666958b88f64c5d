//! Conversation Data Structure
//!
//! One entry of the conversation list as returned by the directory API.

use serde::{Deserialize, Serialize};

use super::PeerId;

/// Summary of a conversation with one peer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Peer id; also the navigation parameter of the conversation screen
    pub id: PeerId,
    /// Display name of the peer
    #[serde(default)]
    pub name: String,
    /// Avatar URL
    #[serde(default)]
    pub image: Option<String>,
    /// Preview of the last message
    #[serde(default, rename = "message")]
    pub last_message: String,
    /// Last activity timestamp, raw as sent by the server
    #[serde(default)]
    pub datetime: String,
    /// Messages from the peer not read yet
    #[serde(default, rename = "unread_messages")]
    pub unread_count: u32,
    /// Category tag used by the list tabs (`doctor`, `patients`, ...)
    #[serde(default)]
    pub role: String,
}

impl Conversation {
    /// Whether the conversation has unread messages
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }

    /// Whether the conversation belongs to the given role tab (`""` = all)
    pub fn matches_role(&self, role: &str) -> bool {
        role.is_empty() || self.role == role
    }
}

/// Response of `GET /chats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListConversationsResponse {
    pub status: bool,
    #[serde(default)]
    pub data: Vec<Conversation>,
}
