//! View Models
//!
//! Plain data for the renderer. The chat list screen shows one
//! [`ConversationRow`] per conversation of the selected [`ChatTab`]; the
//! conversation screen shows one [`MessageBubble`] per displayed message.
//! Relative times are computed against the `now` the caller passes in.

use chrono::{DateTime, Utc};

use crate::client::sync::DisplayedMessage;
use crate::shared::messaging::{Conversation, PeerId, UserId};
use crate::shared::time::time_ago;

/// Shown instead of the list when a tab has no conversations
pub const EMPTY_LIST_MESSAGE: &str = "No Chats Found!!";

/// Tabs of the chat list screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChatTab {
    #[default]
    All,
    Doctors,
    Patients,
}

impl ChatTab {
    pub const ALL: [ChatTab; 3] = [ChatTab::All, ChatTab::Doctors, ChatTab::Patients];

    pub fn label(&self) -> &'static str {
        match self {
            ChatTab::All => "All Chats",
            ChatTab::Doctors => "Doctors Chats",
            ChatTab::Patients => "Patients Chats",
        }
    }

    /// Role tag the tab filters on; empty matches everything
    pub fn role(&self) -> &'static str {
        match self {
            ChatTab::All => "",
            ChatTab::Doctors => "doctor",
            ChatTab::Patients => "patients",
        }
    }

    /// Conversations of this tab, in server order
    pub fn filter<'a>(
        &self,
        conversations: impl IntoIterator<Item = &'a Conversation>,
    ) -> Vec<Conversation> {
        let role = self.role();
        conversations
            .into_iter()
            .filter(|c| c.matches_role(role))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Image(String),
    /// Up to two uppercase letters of the display name
    Initials(String),
}

impl Avatar {
    pub fn for_peer(name: &str, image: Option<&str>) -> Self {
        match image.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Avatar::Image(url.to_string()),
            None => Avatar::Initials(initials(name)),
        }
    }
}

fn initials(name: &str) -> String {
    name.trim().chars().take(2).collect::<String>().to_uppercase()
}

/// One row of the chat list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    pub peer_id: PeerId,
    pub title: String,
    pub avatar: Avatar,
    pub preview: String,
    pub time_ago: String,
    /// `(N)`, only when there are unread messages
    pub unread_badge: Option<String>,
    /// Render title and preview in bold
    pub emphasized: bool,
}

impl ConversationRow {
    pub fn new(conversation: &Conversation, now: DateTime<Utc>) -> Self {
        let unread = conversation.has_unread();
        Self {
            peer_id: conversation.id,
            title: conversation.name.clone(),
            avatar: Avatar::for_peer(&conversation.name, conversation.image.as_deref()),
            preview: conversation.last_message.clone(),
            time_ago: time_ago(&conversation.datetime, now),
            unread_badge: unread.then(|| format!("({})", conversation.unread_count)),
            emphasized: unread,
        }
    }
}

/// One message of the conversation screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble {
    pub body: String,
    /// Sent by the current user (right-aligned)
    pub is_mine: bool,
    /// Double tick under own messages the peer has read
    pub show_read_receipt: bool,
    pub time_ago: String,
    /// Optimistic entry not confirmed by the server yet
    pub pending: bool,
}

impl MessageBubble {
    pub fn new(displayed: &DisplayedMessage, me: UserId, now: DateTime<Utc>) -> Self {
        let message = &displayed.message;
        let is_mine = message.sender_id == me;
        Self {
            body: message.body.clone(),
            is_mine,
            show_read_receipt: is_mine && message.read,
            time_ago: message
                .timestamp_raw()
                .map(|raw| time_ago(raw, now))
                .unwrap_or_default(),
            pending: displayed.pending,
        }
    }
}
