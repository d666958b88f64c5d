//! WebSocket connection task
//!
//! The task owns the socket. It reconnects with exponential backoff when the
//! socket drops or cannot be opened, and exits only when the connection is
//! closed from the outside.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::ConnectionStatus;
use crate::client::config::Config;
use crate::client::error::RealtimeError;
use crate::client::offline::retry::{Backoff, BackoffStrategy};
use crate::shared::event::InboundFrame;
use crate::shared::messaging::OutgoingMessageEnvelope;

/// Tuning of a [`Connection`]
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// How long `send` may wait for room in the outbound queue
    pub send_timeout: Duration,
    /// Reconnect schedule
    pub backoff: BackoffStrategy,
    /// Frames buffered per subscriber before it lags
    pub inbound_capacity: usize,
    pub outbound_capacity: usize,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(5),
            backoff: BackoffStrategy::reconnect(),
            inbound_capacity: 64,
            outbound_capacity: 32,
        }
    }
}

impl ConnectionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            send_timeout: config.send_timeout(),
            ..Self::default()
        }
    }
}

/// A live realtime connection to one endpoint
#[derive(Debug)]
pub struct Connection {
    endpoint: String,
    inbound: broadcast::Sender<InboundFrame>,
    outbound: mpsc::Sender<String>,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    status_rx: watch::Receiver<ConnectionStatus>,
    closed: AtomicBool,
    send_timeout: Duration,
    task: JoinHandle<()>,
}

impl Connection {
    /// Spawn the connection task. Must be called inside a tokio runtime.
    pub fn open(endpoint: impl Into<String>, options: ConnectionOptions) -> Self {
        let endpoint = endpoint.into();
        let (inbound, _) = broadcast::channel(options.inbound_capacity.max(1));
        let (outbound, outbound_rx) = mpsc::channel(options.outbound_capacity.max(1));
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let status_tx = Arc::new(status_tx);

        let task = tokio::spawn(run_connection(
            endpoint.clone(),
            inbound.clone(),
            outbound_rx,
            status_tx.clone(),
            Backoff::new(options.backoff.clone()),
        ));

        Self {
            endpoint,
            inbound,
            outbound,
            status_tx,
            status_rx,
            closed: AtomicBool::new(false),
            send_timeout: options.send_timeout,
            task,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InboundFrame> {
        self.inbound.subscribe()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status_rx.borrow().clone()
    }

    /// Watch status transitions
    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Wait until the socket is connected; false on timeout or close
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        let mut watch = self.status_rx.clone();
        let wait = async {
            loop {
                match &*watch.borrow_and_update() {
                    ConnectionStatus::Connected => return true,
                    ConnectionStatus::Closed => return false,
                    _ => {}
                }
                if watch.changed().await.is_err() {
                    return false;
                }
            }
        };
        tokio::time::timeout(timeout, wait).await.unwrap_or(false)
    }

    /// Queue a raw text frame for the socket
    pub async fn send_text(&self, text: String) -> Result<(), RealtimeError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RealtimeError::Closed);
        }
        if !self.status().is_connected() {
            return Err(RealtimeError::NotConnected);
        }
        match tokio::time::timeout(self.send_timeout, self.outbound.send(text)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(RealtimeError::Closed),
            Err(_) => Err(RealtimeError::Timeout),
        }
    }

    /// Serialize an envelope and queue it
    pub async fn send(&self, envelope: &OutgoingMessageEnvelope) -> Result<(), RealtimeError> {
        let frame = envelope.to_frame()?;
        self.send_text(frame).await
    }

    /// Stop the task and refuse further sends
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.task.abort();
        self.status_tx.send_replace(ConnectionStatus::Closed);
        tracing::info!("[REALTIME] Closed connection to {}", self.endpoint);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_connection(
    endpoint: String,
    inbound: broadcast::Sender<InboundFrame>,
    mut outbound: mpsc::Receiver<String>,
    status: Arc<watch::Sender<ConnectionStatus>>,
    mut backoff: Backoff,
) {
    loop {
        status.send_replace(ConnectionStatus::Connecting);
        tracing::debug!("[REALTIME] Connecting to {}", endpoint);

        let last_error = match connect_async(endpoint.as_str()).await {
            Ok((socket, _response)) => {
                tracing::info!("[REALTIME] Connected to {}", endpoint);
                status.send_replace(ConnectionStatus::Connected);
                backoff.reset();

                let (mut write, mut read) = socket.split();
                loop {
                    tokio::select! {
                        frame = read.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                tracing::debug!("[REALTIME] Inbound text frame ({} bytes)", text.len());
                                let _ = inbound.send(InboundFrame::new(text));
                            }
                            Some(Ok(Message::Binary(bytes))) => {
                                tracing::debug!("[REALTIME] Inbound binary frame ({} bytes)", bytes.len());
                                let _ = inbound.send(InboundFrame::new(String::from_utf8_lossy(&bytes)));
                            }
                            Some(Ok(Message::Close(frame))) => {
                                break format!("closed by server: {:?}", frame);
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => break format!("read error: {}", e),
                            None => break "stream ended".to_string(),
                        },
                        text = outbound.recv() => match text {
                            Some(text) => {
                                if let Err(e) = write.send(Message::Text(text)).await {
                                    tracing::error!("[REALTIME] Dropping outbound frame: {}", e);
                                    break format!("write error: {}", e);
                                }
                            }
                            None => {
                                let _ = write.send(Message::Close(None)).await;
                                status.send_replace(ConnectionStatus::Closed);
                                return;
                            }
                        },
                    }
                }
            }
            Err(e) => format!("connect failed: {}", e),
        };

        let delay = backoff.next_delay();
        tracing::warn!(
            "[REALTIME] Connection to {} lost ({}); reconnecting in {:?}",
            endpoint,
            last_error,
            delay
        );
        status.send_replace(ConnectionStatus::Retrying {
            attempt: backoff.attempts(),
            last_error,
        });
        tokio::time::sleep(delay).await;
    }
}
