//! In-process WebSocket server for realtime tests
//!
//! Accepts any number of connections. Text frames from clients are
//! forwarded to `received`; `push` sends a text frame to every connected
//! client and `kick` closes every current connection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone)]
enum Command {
    Push(String),
    Kick,
}

pub struct TestWsServer {
    pub url: String,
    pub received: mpsc::UnboundedReceiver<String>,
    commands: broadcast::Sender<Command>,
    accepted: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl TestWsServer {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws/chat", listener.local_addr().unwrap());
        let (commands, _) = broadcast::channel(16);
        let (received_tx, received) = mpsc::unbounded_channel();
        let accepted = Arc::new(AtomicUsize::new(0));

        let task = {
            let commands = commands.clone();
            let accepted = Arc::clone(&accepted);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    // Subscribe before the handshake so no push is missed
                    let mut command_rx = commands.subscribe();
                    let received_tx = received_tx.clone();
                    let accepted = Arc::clone(&accepted);
                    tokio::spawn(async move {
                        let Ok(socket) = accept_async(stream).await else {
                            return;
                        };
                        accepted.fetch_add(1, Ordering::SeqCst);
                        let (mut write, mut read) = socket.split();
                        loop {
                            tokio::select! {
                                frame = read.next() => match frame {
                                    Some(Ok(Message::Text(text))) => {
                                        let _ = received_tx.send(text);
                                    }
                                    Some(Ok(_)) => {}
                                    _ => break,
                                },
                                command = command_rx.recv() => match command {
                                    Ok(Command::Push(text)) => {
                                        if write.send(Message::Text(text)).await.is_err() {
                                            break;
                                        }
                                    }
                                    Ok(Command::Kick) | Err(_) => {
                                        let _ = write.send(Message::Close(None)).await;
                                        break;
                                    }
                                },
                            }
                        }
                    });
                }
            })
        };

        Self {
            url,
            received,
            commands,
            accepted,
            task,
        }
    }

    /// Send a text frame to every connected client
    pub fn push(&self, text: &str) {
        let _ = self.commands.send(Command::Push(text.to_string()));
    }

    /// Close every current connection from the server side
    pub fn kick(&self) {
        let _ = self.commands.send(Command::Kick);
    }

    /// Connections accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for TestWsServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
