//! # Screen Sync Components
//!
//! Each screen owns one sync component that keeps a snapshot of server state
//! and refreshes it from the [`ChatDirectory`](crate::client::ChatDirectory):
//!
//! - [`ChatListSync`] - the conversation list, refreshed on focus and on
//!   every realtime frame
//! - [`ConversationSync`] - one conversation, refreshed on open and on every
//!   realtime frame (or updated incrementally in [`EventMode::Typed`]);
//!   also sends messages over the realtime channel
//!
//! Snapshots are `Arc<Vec<_>>` and only ever replaced as a whole.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatsync::client::sync::{ChatListSync, SyncOptions};
//!
//! # async fn example(
//! #     directory: Arc<dyn chatsync::client::ChatDirectory>,
//! #     channel: Arc<dyn chatsync::client::RealtimeChannel>,
//! # ) {
//! let list = Arc::new(ChatListSync::new(directory, channel, SyncOptions::default()));
//! let _listener = list.start();
//! list.on_focus().await;
//! # }
//! ```

pub mod chat_list;
pub mod conversation;
pub mod sequencer;

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::client::error::SyncError;
use crate::client::offline::optimistic::DEFAULT_PENDING_TTL;
use crate::client::offline::retry::RetryPolicy;
use crate::shared::config::AppConfig;
use crate::shared::event::InboundFrame;

pub use chat_list::ChatListSync;
pub use conversation::{ConversationSync, DisplayedMessage, FrameOutcome, PeerProfile, SendReceipt};
pub use sequencer::{RefreshSequencer, RefreshTicket};

/// How inbound realtime frames are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventMode {
    /// Every frame triggers one full refresh; frames are never parsed
    #[default]
    RefreshOnAny,
    /// Known event types are applied incrementally, the rest refresh
    Typed,
}

/// Behaviour shared by the sync components
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub retry: RetryPolicy,
    pub event_mode: EventMode,
    /// Show sent messages before the server echoes them
    pub optimistic_send: bool,
    /// Lifetime of unconfirmed optimistic messages
    pub pending_ttl: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            event_mode: EventMode::RefreshOnAny,
            optimistic_send: false,
            pending_ttl: DEFAULT_PENDING_TTL,
        }
    }
}

impl SyncOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            retry: RetryPolicy::with_attempts(config.refresh_attempts),
            event_mode: if config.typed_events {
                EventMode::Typed
            } else {
                EventMode::RefreshOnAny
            },
            optimistic_send: config.optimistic_send,
            pending_ttl: DEFAULT_PENDING_TTL,
        }
    }
}

/// Result of one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was replaced with `count` items
    Applied { count: usize },
    /// The fetch failed; the snapshot was cleared
    Failed(SyncError),
    /// A newer refresh was issued meanwhile; the result was dropped
    Stale,
    /// The component was torn down; the result was dropped
    Discarded,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }
}

/// What the frame listener hands to a component
#[derive(Debug, Clone)]
pub enum FrameSignal {
    Frame(InboundFrame),
    /// The listener fell behind and `n` frames were skipped
    Lagged(u64),
}

/// Aborts the listener task when dropped
#[derive(Debug)]
pub struct ListenerGuard {
    handle: JoinHandle<()>,
}

impl ListenerGuard {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Feed every frame of `frames` to `on_signal`, one at a time
pub(crate) fn spawn_frame_listener<F, Fut>(
    label: &'static str,
    mut frames: broadcast::Receiver<InboundFrame>,
    mut on_signal: F,
) -> ListenerGuard
where
    F: FnMut(FrameSignal) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        loop {
            match frames.recv().await {
                Ok(frame) => on_signal(FrameSignal::Frame(frame)).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[SYNC] {} listener skipped {} frames", label, skipped);
                    on_signal(FrameSignal::Lagged(skipped)).await;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[SYNC] {} listener: channel closed", label);
                    break;
                }
            }
        }
    });
    ListenerGuard { handle }
}
