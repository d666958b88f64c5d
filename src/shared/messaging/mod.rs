//! Messaging Module
//!
//! Wire types for the chat backend:
//!
//! - `Conversation` - One row of the conversation list
//! - `ChatMessage` - A message in a one-to-one conversation
//! - `OutgoingMessageEnvelope` - The frame pushed onto the realtime channel
//!
//! # Usage
//!
//! ```rust
//! use chatsync::shared::messaging::{ChatMessage, Conversation, OutgoingMessageEnvelope};
//! ```

pub mod conversation;
pub mod envelope;
pub mod message;

/// Identifier of a user on the chat backend
pub type UserId = u64;
/// Identifier of the other participant of a conversation
pub type PeerId = UserId;

pub use conversation::{Conversation, ListConversationsResponse};
pub use envelope::OutgoingMessageEnvelope;
pub use message::{ChatMessage, ConversationResponse};
