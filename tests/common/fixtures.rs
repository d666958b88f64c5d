//! Wire type fixtures

use chatsync::shared::messaging::{ChatMessage, Conversation, ConversationResponse, PeerId, UserId};

pub fn conversation(id: PeerId, name: &str, role: &str) -> Conversation {
    Conversation {
        id,
        name: name.to_string(),
        image: None,
        last_message: format!("last from {}", name),
        datetime: "2023-12-25T14:30:00Z".to_string(),
        unread_count: 0,
        role: role.to_string(),
    }
}

pub fn message(sender_id: UserId, receiver_id: UserId, body: &str, time: &str) -> ChatMessage {
    ChatMessage {
        sender_id,
        receiver_id,
        body: body.to_string(),
        time: Some(time.to_string()),
        datetime: None,
        read: false,
        client_ref: None,
    }
}

/// A successful conversation response
pub fn history(name: &str, messages: Vec<ChatMessage>) -> ConversationResponse {
    ConversationResponse {
        status: true,
        name: Some(name.to_string()),
        image: None,
        messages,
    }
}

/// Peer 42 ("alice") and user 7, three messages oldest first
pub fn three_message_history() -> ConversationResponse {
    history(
        "alice",
        vec![
            message(42, 7, "first", "25/12/23 14:30:00"),
            message(7, 42, "second", "25/12/23 14:31:00"),
            message(42, 7, "third", "25/12/23 14:32:00"),
        ],
    )
}
