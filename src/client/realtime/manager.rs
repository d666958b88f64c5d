//! Shared realtime connections
//!
//! Screens do not open sockets themselves. They subscribe to an endpoint
//! through the manager and receive a [`RealtimeSubscription`]; every
//! subscription to the same endpoint shares one [`Connection`]. The manager
//! counts subscriptions per endpoint and closes the connection when the last
//! one is released, either through [`ConnectionManager::unsubscribe`] or by
//! dropping the handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::connection::{Connection, ConnectionOptions};
use super::{ConnectionStatus, RealtimeChannel};
use crate::client::error::RealtimeError;
use crate::shared::event::InboundFrame;
use crate::shared::messaging::OutgoingMessageEnvelope;

static GLOBAL_MANAGER: OnceLock<Arc<ConnectionManager>> = OnceLock::new();

#[derive(Debug)]
struct Entry {
    connection: Arc<Connection>,
    subscribers: usize,
}

/// Reference-counted registry of realtime connections
#[derive(Debug)]
pub struct ConnectionManager {
    entries: Mutex<HashMap<String, Entry>>,
    options: ConnectionOptions,
}

impl ConnectionManager {
    pub fn new(options: ConnectionOptions) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            options,
        })
    }

    /// The process-wide manager, created with default options on first use
    pub fn global() -> Arc<Self> {
        Self::init_global(ConnectionOptions::default())
    }

    /// The process-wide manager; `options` only apply if it does not exist yet
    pub fn init_global(options: ConnectionOptions) -> Arc<Self> {
        GLOBAL_MANAGER
            .get_or_init(|| ConnectionManager::new(options))
            .clone()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries stay consistent even if a holder panicked mid-update:
        // every mutation is a single insert/remove or counter change.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Join the connection to `endpoint`, opening it if needed.
    /// Must be called inside a tokio runtime.
    pub fn subscribe(self: &Arc<Self>, endpoint: &str) -> RealtimeSubscription {
        let mut entries = self.entries();
        let entry = entries.entry(endpoint.to_string()).or_insert_with(|| {
            tracing::info!("[REALTIME] Opening shared connection to {}", endpoint);
            Entry {
                connection: Arc::new(Connection::open(endpoint, self.options.clone())),
                subscribers: 0,
            }
        });
        entry.subscribers += 1;
        tracing::debug!(
            "[REALTIME] {} now has {} subscriber(s)",
            endpoint,
            entry.subscribers
        );

        RealtimeSubscription {
            manager: Arc::clone(self),
            endpoint: endpoint.to_string(),
            connection: Arc::clone(&entry.connection),
        }
    }

    /// Release a subscription explicitly (same as dropping it)
    pub fn unsubscribe(&self, subscription: RealtimeSubscription) {
        drop(subscription);
    }

    /// Live subscriptions to `endpoint`
    pub fn subscriber_count(&self, endpoint: &str) -> usize {
        self.entries().get(endpoint).map_or(0, |e| e.subscribers)
    }

    /// Number of open connections
    pub fn connection_count(&self) -> usize {
        self.entries().len()
    }

    fn release(&self, endpoint: &str) {
        let closing = {
            let mut entries = self.entries();
            match entries.get_mut(endpoint) {
                Some(entry) if entry.subscribers > 1 => {
                    entry.subscribers -= 1;
                    None
                }
                Some(_) => entries.remove(endpoint),
                None => None,
            }
        };

        if let Some(entry) = closing {
            tracing::info!("[REALTIME] Last subscriber left {}", endpoint);
            entry.connection.close();
        }
    }
}

/// Handle on a shared realtime connection
#[derive(Debug)]
pub struct RealtimeSubscription {
    manager: Arc<ConnectionManager>,
    endpoint: String,
    connection: Arc<Connection>,
}

impl RealtimeSubscription {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl Drop for RealtimeSubscription {
    fn drop(&mut self) {
        self.manager.release(&self.endpoint);
    }
}

#[async_trait]
impl RealtimeChannel for RealtimeSubscription {
    fn subscribe(&self) -> broadcast::Receiver<InboundFrame> {
        self.connection.subscribe()
    }

    async fn send(&self, envelope: &OutgoingMessageEnvelope) -> Result<(), RealtimeError> {
        self.connection.send(envelope).await
    }

    fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }
}
