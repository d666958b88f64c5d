//! Conversation list sync
//!
//! Holds the last fetched conversation list. Refreshes on screen focus and
//! on every realtime frame; frames are never inspected because list rows are
//! summaries the server derives.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    spawn_frame_listener, FrameSignal, ListenerGuard, RefreshOutcome, RefreshSequencer,
    SyncOptions,
};
use crate::client::directory::ChatDirectory;
use crate::client::error::SyncError;
use crate::client::offline::retry::RetryPolicy;
use crate::client::realtime::RealtimeChannel;
use crate::client::view_model::{ChatTab, ConversationRow};
use crate::shared::event::InboundFrame;
use crate::shared::messaging::Conversation;

#[derive(Debug, Default)]
struct ChatListState {
    conversations: Arc<Vec<Conversation>>,
    in_flight: usize,
    last_error: Option<SyncError>,
}

pub struct ChatListSync {
    directory: Arc<dyn ChatDirectory>,
    channel: Arc<dyn RealtimeChannel>,
    retry: RetryPolicy,
    sequencer: RefreshSequencer,
    state: RwLock<ChatListState>,
}

impl ChatListSync {
    pub fn new(
        directory: Arc<dyn ChatDirectory>,
        channel: Arc<dyn RealtimeChannel>,
        options: SyncOptions,
    ) -> Self {
        Self {
            directory,
            channel,
            retry: options.retry,
            sequencer: RefreshSequencer::new(),
            state: RwLock::new(ChatListState::default()),
        }
    }

    /// Fetch the list and replace the snapshot. On failure the snapshot
    /// becomes empty and the error is kept in `last_error`.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.sequencer.issue();
        self.state.write().await.in_flight += 1;

        let result = self
            .retry
            .run("list_conversations", || self.directory.list_conversations())
            .await;

        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);

        if self.sequencer.is_torn_down() {
            tracing::debug!("[SYNC] Chat list torn down, dropping refresh #{}", ticket.value());
            return RefreshOutcome::Discarded;
        }
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(
                "[SYNC] Dropping stale chat list refresh #{} (latest #{})",
                ticket.value(),
                self.sequencer.latest()
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(conversations) => {
                let count = conversations.len();
                tracing::info!("[SYNC] Chat list refreshed: {} conversations", count);
                state.conversations = Arc::new(conversations);
                state.last_error = None;
                RefreshOutcome::Applied { count }
            }
            Err(e) => {
                tracing::warn!("[SYNC] Chat list refresh failed: {}", e);
                let error = SyncError::Refresh(e);
                state.conversations = Arc::new(Vec::new());
                state.last_error = Some(error.clone());
                RefreshOutcome::Failed(error)
            }
        }
    }

    /// The screen gained focus
    pub async fn on_focus(&self) -> RefreshOutcome {
        self.refresh().await
    }

    /// Any inbound frame means "something changed"
    pub async fn handle_frame(&self, frame: &InboundFrame) -> RefreshOutcome {
        tracing::debug!("[SYNC] Chat list frame at {}", frame.received_at);
        self.refresh().await
    }

    /// Snapshot of the last applied refresh, in server order
    pub async fn conversations(&self) -> Arc<Vec<Conversation>> {
        Arc::clone(&self.state.read().await.conversations)
    }

    /// Conversations of one tab
    pub async fn tab(&self, tab: ChatTab) -> Vec<Conversation> {
        tab.filter(self.state.read().await.conversations.iter())
    }

    /// Rows of one tab, ready to render
    pub async fn rows(&self, tab: ChatTab, now: DateTime<Utc>) -> Vec<ConversationRow> {
        self.tab(tab)
            .await
            .iter()
            .map(|c| ConversationRow::new(c, now))
            .collect()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.in_flight > 0
    }

    pub async fn last_error(&self) -> Option<SyncError> {
        self.state.read().await.last_error.clone()
    }

    /// Refresh once per inbound frame of `channel` until the guard drops.
    /// Lagged frames are coalesced into a single refresh.
    pub fn spawn_listener(self: &Arc<Self>, channel: &dyn RealtimeChannel) -> ListenerGuard {
        let this = Arc::clone(self);
        spawn_frame_listener("chat list", channel.subscribe(), move |signal| {
            let this = Arc::clone(&this);
            async move {
                match signal {
                    FrameSignal::Frame(frame) => this.handle_frame(&frame).await,
                    FrameSignal::Lagged(_) => this.refresh().await,
                };
            }
        })
    }

    /// Listen on the channel the component was built with
    pub fn start(self: &Arc<Self>) -> ListenerGuard {
        let channel = Arc::clone(&self.channel);
        self.spawn_listener(channel.as_ref())
    }

    /// Unmount: results of in-flight and later refreshes are discarded
    pub fn teardown(&self) {
        tracing::debug!("[SYNC] Chat list torn down");
        self.sequencer.tear_down();
    }
}
