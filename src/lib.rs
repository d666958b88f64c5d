//! chatsync - Chat Screen Synchronization
//!
//! Client-side sync layer for a one-to-one chat backend: a conversation list
//! and a single-conversation view kept in step with a REST source of truth,
//! with a shared WebSocket connection carrying live-update triggers and
//! outgoing messages.
//!
//! # Overview
//!
//! - Snapshot state: every refresh replaces the held list wholesale
//! - Refresh on focus, on open and on every realtime frame
//! - Stale refresh results are discarded (sequence tickets)
//! - One reference-counted realtime connection per endpoint, with reconnect
//! - Optional typed realtime events and optimistic sending
//!
//! # Module Structure
//!
//! - **`shared`** - Types with no I/O
//!   - Wire types (conversations, messages, outgoing envelope)
//!   - Realtime frames and typed events
//!   - Configuration, errors, timestamp formatting
//!
//! - **`client`** - Everything that talks to the backend
//!   - REST directory client (reqwest)
//!   - Realtime connection and connection manager (tokio-tungstenite)
//!   - `ChatListSync` / `ConversationSync`
//!   - Retry, optimistic outbox, view models
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatsync::client::sync::{ConversationSync, SyncOptions};
//! use chatsync::client::{Config, ConnectionManager, HttpChatDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let directory = Arc::new(HttpChatDirectory::new(config.clone())?);
//! let channel = Arc::new(ConnectionManager::global().subscribe(config.ws_url()));
//!
//! let sync = Arc::new(ConversationSync::new(directory, channel, 7, SyncOptions::default()));
//! let _listener = sync.start();
//! sync.open(42).await;
//! sync.send_message("hello").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Sync components keep their state behind a `tokio::sync::RwLock` and are
//! shared as `Arc`s between the screen and its listener task. Inbound frames
//! fan out on a `broadcast` channel; connection status is a `watch` channel.
//!
//! # Logging
//!
//! The library only emits `tracing` events. Installing a subscriber is up to
//! the binary (`chat-watch` honours `RUST_LOG`, default `chatsync=info`).

/// Shared types and data structures
pub mod shared;

/// REST, realtime and sync components
pub mod client;
