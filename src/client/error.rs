//! Client Error Types
//!
//! One enum per layer:
//!
//! - `DirectoryError` - REST calls to the chat directory
//! - `RealtimeError` - the realtime channel
//! - `SyncError` - what the sync components surface to the UI layer
//!
//! Errors stored in component state are `Clone`, so transport errors are
//! flattened to strings at the boundary.

use thiserror::Error;

use crate::shared::SharedError;

/// Errors returned by a [`ChatDirectory`](crate::client::directory::ChatDirectory)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("Request failed with HTTP {status}")]
    Http { status: u16 },

    /// The body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The server answered `status: false`
    #[error("Server rejected the request")]
    Rejected,

    /// No authenticated session
    #[error("Not authenticated")]
    Unauthenticated,
}

impl DirectoryError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            DirectoryError::Network(_) | DirectoryError::Timeout => true,
            DirectoryError::Http { status } => *status == 429 || (500..600).contains(status),
            DirectoryError::Decode(_) | DirectoryError::Rejected | DirectoryError::Unauthenticated => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DirectoryError::Timeout
        } else if err.is_decode() {
            DirectoryError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            DirectoryError::Http {
                status: status.as_u16(),
            }
        } else {
            DirectoryError::Network(err.to_string())
        }
    }
}

/// Errors of the realtime channel
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RealtimeError {
    /// The socket is connecting or waiting to reconnect
    #[error("Realtime channel is not connected")]
    NotConnected,

    /// The channel was torn down
    #[error("Realtime channel is closed")]
    Closed,

    /// The outbound queue did not accept the frame in time
    #[error("Timed out queueing outbound frame")]
    Timeout,

    /// The envelope could not be encoded
    #[error(transparent)]
    Encode(#[from] SharedError),
}

/// Errors surfaced by the sync components
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Refresh failed: {0}")]
    Refresh(#[from] DirectoryError),

    #[error("Send failed: {0}")]
    Send(#[from] RealtimeError),

    #[error("No conversation is open")]
    NoConversation,
}
