//! Realtime Channel
//!
//! One long-lived WebSocket per endpoint, shared by every screen through the
//! [`ConnectionManager`]. Inbound frames are fanned out on a broadcast
//! channel; outbound messages are JSON text frames.
//!
//! - `connection.rs` - socket task, reconnect loop, outbound queue
//! - `manager.rs` - reference-counted sharing of connections

pub mod connection;
pub mod manager;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::client::error::RealtimeError;
use crate::shared::event::InboundFrame;
use crate::shared::messaging::OutgoingMessageEnvelope;

pub use connection::{Connection, ConnectionOptions};
pub use manager::{ConnectionManager, RealtimeSubscription};

/// Connection state reported by the realtime channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    /// Waiting before the next reconnect attempt
    Retrying {
        attempt: u32,
        last_error: String,
    },
    /// Torn down; no further reconnects
    Closed,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

/// What the sync components need from a realtime connection
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Receive every inbound frame from now on
    fn subscribe(&self) -> broadcast::Receiver<InboundFrame>;

    /// Serialize and transmit an envelope; no delivery confirmation
    async fn send(&self, envelope: &OutgoingMessageEnvelope) -> Result<(), RealtimeError>;

    fn status(&self) -> ConnectionStatus;
}
