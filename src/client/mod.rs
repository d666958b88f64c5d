//! Chat Client Module
//!
//! Everything that talks to the chat backend, plus the per-screen sync
//! components built on top of it.
//!
//! # Architecture
//!
//! - **`config`** - Client configuration (endpoint URLs, token)
//! - **`directory`** - REST client for the conversation list and histories
//! - **`realtime`** - Shared WebSocket connections and the connection manager
//! - **`sync`** - `ChatListSync` and `ConversationSync`
//! - **`offline`** - Retry/backoff and the optimistic outbox
//! - **`view_model`** - Rows and bubbles for the renderer
//! - **`error`** - Error types of each layer
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs         - Module exports and documentation
//! ├── main.rs        - chat-watch diagnostic binary
//! ├── config.rs      - Configuration wrapper
//! ├── directory.rs   - ChatDirectory trait + reqwest implementation
//! ├── error.rs       - DirectoryError, RealtimeError, SyncError
//! ├── view_model.rs  - ChatTab, ConversationRow, MessageBubble
//! ├── offline/       - RetryPolicy, OptimisticOutbox
//! ├── realtime/      - Connection, ConnectionManager
//! └── sync/          - Sync components, refresh sequencing
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod offline;
pub mod realtime;
pub mod sync;
pub mod view_model;

pub use config::Config;
pub use directory::{ChatDirectory, HttpChatDirectory};
pub use error::{DirectoryError, RealtimeError, SyncError};
pub use realtime::{ConnectionManager, ConnectionStatus, RealtimeChannel, RealtimeSubscription};
pub use sync::{ChatListSync, ConversationSync, EventMode, RefreshOutcome, SyncOptions};
pub use view_model::{ChatTab, ConversationRow, MessageBubble, EMPTY_LIST_MESSAGE};
