/**
 * chat-watch Entry Point
 *
 * Headless diagnostic client. Without arguments it tails the conversation
 * list; with a peer id it tails that conversation. Every refresh is logged.
 *
 *   chat-watch          # conversation list
 *   chat-watch 42       # conversation with peer 42
 */
use std::sync::Arc;

use chatsync::client::realtime::ConnectionOptions;
use chatsync::client::sync::{ChatListSync, ConversationSync, SyncOptions};
use chatsync::client::{ChatTab, Config, ConnectionManager, HttpChatDirectory};
use chatsync::shared::config::ConfigError;
use chatsync::shared::messaging::PeerId;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "chatsync=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let peer = match std::env::args().nth(1) {
        Some(arg) => Some(
            arg.parse::<PeerId>()
                .map_err(|e| format!("Invalid peer id '{}': {}", arg, e))?,
        ),
        None => None,
    };

    let config = Config::load()?;
    tracing::info!("[STARTUP] API {} / realtime {}", config.api_url(""), config.ws_url());

    let directory = Arc::new(HttpChatDirectory::new(config.clone())?);
    let manager = ConnectionManager::init_global(ConnectionOptions::from_config(&config));
    let channel = Arc::new(manager.subscribe(config.ws_url()));
    let options = SyncOptions::from_config(config.app());

    match peer {
        Some(peer) => {
            let me = config
                .user_id()
                .ok_or(ConfigError::MissingValue("user_id (CHAT_USER_ID)"))?;
            let sync = Arc::new(ConversationSync::new(directory, channel, me, options));
            let _listener = sync.start();
            sync.open(peer).await;
            if let Some(title) = sync.header_title().await {
                tracing::info!("[WATCH] Conversation with {}", title);
            }

            tokio::signal::ctrl_c().await?;
            sync.teardown();
        }
        None => {
            let sync = Arc::new(ChatListSync::new(directory, channel, options));
            let _listener = sync.start();
            sync.on_focus().await;
            for tab in ChatTab::ALL {
                tracing::info!("[WATCH] {}: {}", tab.label(), sync.tab(tab).await.len());
            }

            tokio::signal::ctrl_c().await?;
            sync.teardown();
        }
    }

    tracing::info!("[WATCH] Shutting down");
    Ok(())
}
