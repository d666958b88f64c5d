//! Single conversation sync
//!
//! Holds the message history with one peer and the peer's profile, and
//! submits outgoing messages over the realtime channel. In
//! [`EventMode::RefreshOnAny`] every inbound frame triggers one full refresh.
//! In [`EventMode::Typed`] message and read events for the open conversation
//! are applied to the snapshot directly, unless a refresh is in flight, in
//! which case a newer refresh supersedes it. Events about other conversations
//! are ignored and anything else falls back to a refresh.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    spawn_frame_listener, EventMode, FrameSignal, ListenerGuard, RefreshOutcome,
    RefreshSequencer, SyncOptions,
};
use crate::client::directory::ChatDirectory;
use crate::client::error::{RealtimeError, SyncError};
use crate::client::offline::optimistic::OptimisticOutbox;
use crate::client::realtime::RealtimeChannel;
use crate::client::view_model::MessageBubble;
use crate::shared::event::{InboundFrame, RealtimeEvent};
use crate::shared::messaging::{ChatMessage, OutgoingMessageEnvelope, PeerId, UserId};

/// Peer metadata returned with the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerProfile {
    pub name: String,
    pub image: Option<String>,
}

/// A message as displayed, possibly not confirmed by the server yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedMessage {
    pub message: ChatMessage,
    pub pending: bool,
}

impl DisplayedMessage {
    pub fn confirmed(message: ChatMessage) -> Self {
        Self {
            message,
            pending: false,
        }
    }

    pub fn pending(message: ChatMessage) -> Self {
        Self {
            message,
            pending: true,
        }
    }
}

/// What `send_message` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReceipt {
    /// Blank body, nothing was sent
    Skipped,
    /// One frame was queued on the channel
    Sent { client_ref: Option<Uuid> },
}

/// What handling one inbound frame did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Refreshed(RefreshOutcome),
    /// A new message was appended to the snapshot
    Appended,
    /// `count` messages were marked read
    MarkedRead { count: usize },
    /// The frame concerned another conversation
    Ignored,
}

#[derive(Debug, Default)]
struct ConversationState {
    peer: Option<PeerId>,
    profile: Option<PeerProfile>,
    messages: Arc<Vec<ChatMessage>>,
    draft: String,
    outbox: OptimisticOutbox,
    in_flight: usize,
    last_error: Option<SyncError>,
}

impl ConversationState {
    /// Requests already sent still count as in flight
    fn reset_for(&mut self, peer: PeerId) {
        *self = ConversationState {
            peer: Some(peer),
            in_flight: self.in_flight,
            ..ConversationState::default()
        };
    }
}

pub struct ConversationSync {
    directory: Arc<dyn ChatDirectory>,
    channel: Arc<dyn RealtimeChannel>,
    me: UserId,
    options: SyncOptions,
    sequencer: RefreshSequencer,
    state: RwLock<ConversationState>,
}

impl ConversationSync {
    /// `me` is the signed-in user; messages are sent on their behalf
    pub fn new(
        directory: Arc<dyn ChatDirectory>,
        channel: Arc<dyn RealtimeChannel>,
        me: UserId,
        options: SyncOptions,
    ) -> Self {
        Self {
            directory,
            channel,
            me,
            options,
            sequencer: RefreshSequencer::new(),
            state: RwLock::new(ConversationState::default()),
        }
    }

    pub fn me(&self) -> UserId {
        self.me
    }

    pub async fn peer(&self) -> Option<PeerId> {
        self.state.read().await.peer
    }

    /// Mount the screen for `peer`, or switch to it. Switching clears the
    /// snapshot, profile, draft and pending messages.
    pub async fn open(&self, peer: PeerId) -> RefreshOutcome {
        {
            let mut state = self.state.write().await;
            if state.peer != Some(peer) {
                tracing::info!("[SYNC] Opening conversation with {}", peer);
                state.reset_for(peer);
            }
        }
        self.refresh().await
    }

    /// Fetch the open conversation and replace the snapshot. On failure the
    /// messages and the profile are cleared.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (peer, ticket) = {
            let mut state = self.state.write().await;
            let Some(peer) = state.peer else {
                return RefreshOutcome::Failed(SyncError::NoConversation);
            };
            state.in_flight += 1;
            (peer, self.sequencer.issue())
        };

        let result = self
            .options
            .retry
            .run("get_conversation", || self.directory.get_conversation(peer))
            .await;

        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);

        if self.sequencer.is_torn_down() {
            tracing::debug!("[SYNC] Conversation torn down, dropping refresh #{}", ticket.value());
            return RefreshOutcome::Discarded;
        }
        if !self.sequencer.is_current(ticket) || state.peer != Some(peer) {
            tracing::debug!(
                "[SYNC] Dropping stale refresh #{} of conversation {}",
                ticket.value(),
                peer
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(response) => {
                let count = response.messages.len();
                let confirmed = state
                    .outbox
                    .reconcile(&response.messages, self.options.pending_ttl);
                tracing::info!(
                    "[SYNC] Conversation {} refreshed: {} messages, {} pending confirmed",
                    peer,
                    count,
                    confirmed
                );
                state.profile = Some(PeerProfile {
                    name: response.name.unwrap_or_default(),
                    image: response.image,
                });
                state.messages = Arc::new(response.messages);
                state.last_error = None;
                RefreshOutcome::Applied { count }
            }
            Err(e) => {
                tracing::warn!("[SYNC] Conversation {} refresh failed: {}", peer, e);
                let error = SyncError::Refresh(e);
                state.messages = Arc::new(Vec::new());
                state.profile = None;
                state.last_error = Some(error.clone());
                RefreshOutcome::Failed(error)
            }
        }
    }

    /// React to one inbound frame according to the event mode
    pub async fn handle_frame(&self, frame: &InboundFrame) -> FrameOutcome {
        match self.options.event_mode {
            EventMode::RefreshOnAny => FrameOutcome::Refreshed(self.refresh().await),
            EventMode::Typed => self.apply_event(RealtimeEvent::parse(frame)).await,
        }
    }

    async fn apply_event(&self, event: RealtimeEvent) -> FrameOutcome {
        let Some(peer) = self.peer().await else {
            return FrameOutcome::Ignored;
        };
        if !event.concerns(self.me, peer) {
            tracing::debug!("[SYNC] Event for another conversation ignored");
            return FrameOutcome::Ignored;
        }

        match event {
            RealtimeEvent::MessageReceived { message } => {
                let mut state = self.state.write().await;
                if self.sequencer.is_torn_down() || state.peer != Some(peer) {
                    return FrameOutcome::Ignored;
                }
                if state.in_flight > 0 {
                    drop(state);
                    return self.refresh_instead().await;
                }
                let duplicate = message.client_ref.is_some()
                    && state.messages.iter().any(|m| m.client_ref == message.client_ref);
                if duplicate {
                    return FrameOutcome::Ignored;
                }

                state
                    .outbox
                    .reconcile(std::slice::from_ref(&message), self.options.pending_ttl);
                let mut messages = Vec::clone(&state.messages);
                messages.push(message);
                state.messages = Arc::new(messages);
                FrameOutcome::Appended
            }
            RealtimeEvent::MessageRead { reader_id, .. } => {
                let mut state = self.state.write().await;
                if self.sequencer.is_torn_down() || state.peer != Some(peer) {
                    return FrameOutcome::Ignored;
                }
                if state.in_flight > 0 {
                    drop(state);
                    return self.refresh_instead().await;
                }
                // The reader's inbox is what became read
                let sender = if reader_id == peer { self.me } else { peer };
                let mut messages = Vec::clone(&state.messages);
                let mut count = 0;
                for message in messages.iter_mut().filter(|m| m.sender_id == sender && !m.read) {
                    message.read = true;
                    count += 1;
                }
                if count > 0 {
                    state.messages = Arc::new(messages);
                }
                FrameOutcome::MarkedRead { count }
            }
            RealtimeEvent::ConversationUpdated { .. } | RealtimeEvent::Unknown => {
                FrameOutcome::Refreshed(self.refresh().await)
            }
        }
    }

    /// An event that lands while a refresh is in flight would be overwritten
    /// by that refresh's older snapshot. Supersede it with a new one instead.
    async fn refresh_instead(&self) -> FrameOutcome {
        tracing::debug!("[SYNC] Event during refresh, superseding it");
        FrameOutcome::Refreshed(self.refresh().await)
    }

    /// Snapshot of the last applied refresh, in server order
    pub async fn messages(&self) -> Arc<Vec<ChatMessage>> {
        Arc::clone(&self.state.read().await.messages)
    }

    /// The snapshot in display order
    pub async fn messages_newest_first(&self) -> Vec<ChatMessage> {
        self.state.read().await.messages.iter().rev().cloned().collect()
    }

    /// Newest first, unconfirmed optimistic messages on top
    pub async fn displayed_messages(&self) -> Vec<DisplayedMessage> {
        let state = self.state.read().await;
        let mut displayed: Vec<DisplayedMessage> = match state.peer {
            Some(peer) => state
                .outbox
                .pending_for(peer)
                .map(|p| DisplayedMessage::pending(p.message.clone()))
                .collect(),
            None => Vec::new(),
        };
        displayed.reverse();
        displayed.extend(
            state
                .messages
                .iter()
                .rev()
                .cloned()
                .map(DisplayedMessage::confirmed),
        );
        displayed
    }

    /// Bubbles in display order
    pub async fn bubbles(&self, now: DateTime<Utc>) -> Vec<MessageBubble> {
        self.displayed_messages()
            .await
            .iter()
            .map(|m| MessageBubble::new(m, self.me, now))
            .collect()
    }

    /// Screen title once the peer's name is known
    pub async fn header_title(&self) -> Option<String> {
        self.state
            .read()
            .await
            .profile
            .as_ref()
            .map(|p| p.name.clone())
            .filter(|name| !name.is_empty())
    }

    pub async fn peer_profile(&self) -> Option<PeerProfile> {
        self.state.read().await.profile.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.in_flight > 0
    }

    pub async fn last_error(&self) -> Option<SyncError> {
        self.state.read().await.last_error.clone()
    }

    pub async fn pending_count(&self) -> usize {
        self.state.read().await.outbox.count_pending()
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.write().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.state.read().await.draft.clone()
    }

    /// Send whatever is in the input field
    pub async fn send_draft(&self) -> Result<SendReceipt, SyncError> {
        let body = self.draft().await;
        self.send_message(&body).await
    }

    /// Push one message frame onto the realtime channel.
    ///
    /// The draft is cleared before anything else, whatever the outcome.
    /// Blank bodies send nothing. Failures are logged and returned; an
    /// optimistic entry for a failed send is rolled back.
    pub async fn send_message(&self, body: &str) -> Result<SendReceipt, SyncError> {
        let envelope = {
            let mut state = self.state.write().await;
            state.draft.clear();
            if body.trim().is_empty() {
                tracing::debug!("[SYNC] Blank message not sent");
                return Ok(SendReceipt::Skipped);
            }
            let peer = state.peer.ok_or(SyncError::NoConversation)?;

            let mut envelope =
                OutgoingMessageEnvelope::new(body, self.me, peer).map_err(RealtimeError::from)?;
            if self.options.optimistic_send {
                envelope = envelope.with_client_ref(Uuid::new_v4());
                state.outbox.apply(&envelope);
            }
            envelope
        };

        match self.channel.send(&envelope).await {
            Ok(()) => {
                tracing::debug!("[SYNC] Sent message to {}", envelope.receiver_id);
                Ok(SendReceipt::Sent {
                    client_ref: envelope.client_ref,
                })
            }
            Err(e) => {
                tracing::error!("[SYNC] Failed to send message to {}: {}", envelope.receiver_id, e);
                if let Some(client_ref) = envelope.client_ref {
                    self.state.write().await.outbox.rollback(&client_ref);
                }
                Err(SyncError::Send(e))
            }
        }
    }

    /// Handle every inbound frame of `channel` until the guard drops.
    /// Lagged frames are replaced by a single full refresh.
    pub fn spawn_listener(self: &Arc<Self>, channel: &dyn RealtimeChannel) -> ListenerGuard {
        let this = Arc::clone(self);
        spawn_frame_listener("conversation", channel.subscribe(), move |signal| {
            let this = Arc::clone(&this);
            async move {
                match signal {
                    FrameSignal::Frame(frame) => {
                        this.handle_frame(&frame).await;
                    }
                    FrameSignal::Lagged(_) => {
                        this.refresh().await;
                    }
                }
            }
        })
    }

    /// Listen on the channel the component was built with
    pub fn start(self: &Arc<Self>) -> ListenerGuard {
        let channel = Arc::clone(&self.channel);
        self.spawn_listener(channel.as_ref())
    }

    /// Unmount: pending refreshes and events no longer touch the state
    pub fn teardown(&self) {
        tracing::debug!("[SYNC] Conversation torn down");
        self.sequencer.tear_down();
    }
}
