//! # Optimistic UI Updates
//!
//! Outgoing messages are only stored by the server after they travel over
//! the realtime channel, and the client only learns about them on the next
//! refresh. The outbox keeps a pending copy of every sent message so the
//! conversation can show it immediately.
//!
//! A pending entry leaves the outbox when:
//! - a refresh returns a message with the same `client_ref`, or one with the
//!   same sender, receiver and body when the server does not echo refs
//!   (each fetched message confirms at most one entry),
//! - the send fails (rollback), or
//! - it outlives the configured TTL.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::shared::messaging::{ChatMessage, OutgoingMessageEnvelope, PeerId};

/// Default lifetime of an unconfirmed entry
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(120);

/// An outgoing message awaiting confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMessage {
    pub client_ref: Uuid,
    /// Rendered in place of the server copy until confirmed
    pub message: ChatMessage,
    pub applied_at: Instant,
}

/// Pending optimistic messages, oldest first
#[derive(Debug, Default)]
pub struct OptimisticOutbox {
    pending: Vec<PendingMessage>,
}

impl OptimisticOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an envelope about to be sent; envelopes without a
    /// `client_ref` cannot be reconciled and are ignored
    pub fn apply(&mut self, envelope: &OutgoingMessageEnvelope) -> Option<Uuid> {
        let client_ref = envelope.client_ref?;
        let mut message =
            ChatMessage::new_text(envelope.sender_id, envelope.receiver_id, envelope.message.clone());
        message.client_ref = Some(client_ref);

        self.pending.push(PendingMessage {
            client_ref,
            message,
            applied_at: Instant::now(),
        });
        Some(client_ref)
    }

    /// Remove an entry whose send failed
    pub fn rollback(&mut self, client_ref: &Uuid) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.client_ref != *client_ref);
        before != self.pending.len()
    }

    /// Drop entries confirmed by `fetched` and entries older than `ttl`.
    /// Returns the number of confirmed entries.
    pub fn reconcile(&mut self, fetched: &[ChatMessage], ttl: Duration) -> usize {
        let echoed: HashSet<Uuid> = fetched.iter().filter_map(|m| m.client_ref).collect();
        let mut unmatched: Vec<&ChatMessage> =
            fetched.iter().filter(|m| m.client_ref.is_none()).collect();

        let mut confirmed = 0;
        self.pending.retain(|pending| {
            if echoed.contains(&pending.client_ref) {
                confirmed += 1;
                return false;
            }
            let same_content = unmatched.iter().position(|m| {
                m.sender_id == pending.message.sender_id
                    && m.receiver_id == pending.message.receiver_id
                    && m.body == pending.message.body
            });
            if let Some(index) = same_content {
                unmatched.remove(index);
                confirmed += 1;
                return false;
            }
            if pending.applied_at.elapsed() > ttl {
                tracing::warn!(
                    "[OPTIMISTIC] Dropping unconfirmed message {} after {:?}",
                    pending.client_ref,
                    ttl
                );
                return false;
            }
            true
        });
        confirmed
    }

    /// Pending messages exchanged with `peer`, oldest first
    pub fn pending_for(&self, peer: PeerId) -> impl Iterator<Item = &PendingMessage> {
        self.pending.iter().filter(move |p| p.message.receiver_id == peer)
    }

    pub fn count_pending(&self) -> usize {
        self.pending.len()
    }
}
