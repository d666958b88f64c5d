//! Shared Module
//!
//! Types and pure functions with no I/O: the wire model of the chat backend,
//! realtime frames and typed events, configuration, errors and timestamp
//! formatting. Everything in `client` builds on these.

/// Messaging wire types
pub mod messaging;

/// Realtime frames and typed events
pub mod event;

/// Shared error types
pub mod error;

/// Timestamp parsing and relative rendering
pub mod time;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::{InboundFrame, RealtimeEvent};
pub use messaging::{ChatMessage, Conversation, OutgoingMessageEnvelope, PeerId, UserId};
