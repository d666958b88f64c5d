/**
 * Real-time Event System
 *
 * Inbound frames arrive from the realtime channel as opaque text. Consumers
 * that only need a "something changed" trigger never look inside; consumers
 * that opt into typed events call `RealtimeEvent::parse`, which understands
 * the `{"type": ..., ...}` protocol and maps everything else to `Unknown` so
 * the caller can fall back to a full refresh.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::messaging::{ChatMessage, PeerId, UserId};

/// A raw frame received from the realtime channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Frame payload, untouched
    pub raw: String,
    /// When the frame was read off the socket
    pub received_at: DateTime<Utc>,
}

impl InboundFrame {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            received_at: Utc::now(),
        }
    }
}

/// Typed realtime event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// A new message was stored on the server
    MessageReceived { message: ChatMessage },
    /// `reader_id` has read everything `peer_id` sent them
    MessageRead { reader_id: UserId, peer_id: PeerId },
    /// Conversation metadata changed (name, avatar, role)
    ConversationUpdated { peer_id: PeerId },
    /// Anything this client does not understand
    #[serde(skip)]
    Unknown,
}

impl RealtimeEvent {
    /// Interpret a frame; never fails, unrecognized frames become `Unknown`
    pub fn parse(frame: &InboundFrame) -> Self {
        match serde_json::from_str::<RealtimeEvent>(&frame.raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("[REALTIME] Untyped frame ({}), treating as unknown", e);
                RealtimeEvent::Unknown
            }
        }
    }

    /// Whether the event concerns the conversation between `me` and `peer`
    pub fn concerns(&self, me: UserId, peer: PeerId) -> bool {
        match self {
            RealtimeEvent::MessageReceived { message } => {
                message.involves(peer) && message.involves(me)
            }
            RealtimeEvent::MessageRead { reader_id, peer_id } => {
                (*reader_id == peer && *peer_id == me) || (*reader_id == me && *peer_id == peer)
            }
            RealtimeEvent::ConversationUpdated { peer_id } => *peer_id == peer,
            RealtimeEvent::Unknown => true,
        }
    }
}
