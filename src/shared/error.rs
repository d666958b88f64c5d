//! Shared Error Types
//!
//! Errors that can occur while handling wire data, independent of any
//! transport. The client layers wrap these in their own error enums.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures
//! - `TimestampError` - A timestamp matched none of the accepted formats
//!
//! # Usage
//!
//! ```rust
//! use chatsync::shared::error::SharedError;
//!
//! let error = SharedError::validation("message", "Message body cannot be empty");
//! ```
use thiserror::Error;

/// Shared error types for wire data handling
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Timestamp could not be parsed
    #[error("Unrecognized timestamp: '{value}'")]
    TimestampError {
        /// The raw value received from the server
        value: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new timestamp error
    pub fn timestamp(value: impl Into<String>) -> Self {
        Self::TimestampError {
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
