//! Conversation sync integration tests

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use chatsync::client::offline::RetryPolicy;
use chatsync::client::sync::{
    ConversationSync, EventMode, FrameOutcome, RefreshOutcome, SendReceipt, SyncOptions,
};
use chatsync::client::{DirectoryError, RealtimeError, SyncError};
use chatsync::shared::event::InboundFrame;

use crate::common::assertions::{wait_until, SETTLE};
use crate::common::{history, message, three_message_history, FakeDirectory, MemoryChannel};

const ME: u64 = 7;
const PEER: u64 = 42;

fn options(event_mode: EventMode, optimistic_send: bool) -> SyncOptions {
    SyncOptions {
        retry: RetryPolicy::none(),
        event_mode,
        optimistic_send,
        ..SyncOptions::default()
    }
}

fn conversation_with(
    directory: &Arc<FakeDirectory>,
    channel: &Arc<MemoryChannel>,
    options: SyncOptions,
) -> Arc<ConversationSync> {
    Arc::new(ConversationSync::new(directory.clone(), channel.clone(), ME, options))
}

fn setup() -> (Arc<FakeDirectory>, Arc<MemoryChannel>, Arc<ConversationSync>) {
    let directory = FakeDirectory::new();
    directory.set_history(PEER, Ok(three_message_history()));
    let channel = MemoryChannel::new();
    let sync = conversation_with(&directory, &channel, options(EventMode::RefreshOnAny, false));
    (directory, channel, sync)
}

#[tokio::test]
async fn test_open_fetches_once_and_shows_newest_first() {
    let (directory, _channel, sync) = setup();

    assert_eq!(sync.open(PEER).await, RefreshOutcome::Applied { count: 3 });
    assert_eq!(directory.get_calls(), vec![PEER]);

    let bodies: Vec<String> = sync
        .displayed_messages()
        .await
        .into_iter()
        .map(|m| m.message.body)
        .collect();
    assert_eq!(bodies, vec!["third", "second", "first"]);

    let server_order: Vec<String> = sync.messages().await.iter().map(|m| m.body.clone()).collect();
    assert_eq!(server_order, vec!["first", "second", "third"]);
    assert_eq!(sync.header_title().await.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_frame_triggers_exactly_one_refresh() {
    let (directory, channel, sync) = setup();
    let _listener = sync.start();
    sync.open(PEER).await;

    channel.push(r#"{"type":"message_received","message":"not a message object"}"#);

    wait_until("frame refresh", SETTLE, || directory.get_calls().len() == 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(directory.get_calls(), vec![PEER, PEER]);
}

#[tokio::test]
async fn test_send_hello() {
    let (_directory, channel, sync) = setup();
    sync.open(PEER).await;
    sync.set_draft("hello").await;

    let receipt = sync.send_draft().await.unwrap();

    assert_eq!(receipt, SendReceipt::Sent { client_ref: None });
    assert_eq!(sync.draft().await, "");
    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    let frame: serde_json::Value = serde_json::from_str(&sent[0].to_frame().unwrap()).unwrap();
    assert_eq!(
        frame,
        serde_json::json!({"message": "hello", "sender_id": 7, "receiver_id": 42})
    );
}

#[tokio::test]
async fn test_blank_body_sends_nothing() {
    let (_directory, channel, sync) = setup();
    sync.open(PEER).await;

    for body in ["", "   ", "\n\t"] {
        sync.set_draft(body).await;
        assert_eq!(sync.send_draft().await, Ok(SendReceipt::Skipped));
        assert_eq!(sync.draft().await, "");
    }
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_send_failure_clears_draft_and_surfaces_error() {
    let (_directory, channel, sync) = setup();
    sync.open(PEER).await;
    channel.fail_sends(RealtimeError::NotConnected);

    sync.set_draft("hello").await;
    let result = sync.send_draft().await;

    assert_eq!(result, Err(SyncError::Send(RealtimeError::NotConnected)));
    assert_eq!(sync.draft().await, "");
}

#[tokio::test]
async fn test_send_without_open_conversation() {
    let directory = FakeDirectory::new();
    let channel = MemoryChannel::new();
    let sync = conversation_with(&directory, &channel, SyncOptions::default());

    assert_eq!(sync.send_message("hello").await, Err(SyncError::NoConversation));
    assert_matches!(sync.refresh().await, RefreshOutcome::Failed(SyncError::NoConversation));
    assert!(directory.get_calls().is_empty());
}

#[tokio::test]
async fn test_failure_clears_messages_and_title() {
    let (directory, _channel, sync) = setup();
    sync.open(PEER).await;
    assert_eq!(sync.messages().await.len(), 3);

    directory.set_history(PEER, Err(DirectoryError::Http { status: 500 }));
    assert_matches!(sync.refresh().await, RefreshOutcome::Failed(_));

    assert!(sync.messages().await.is_empty());
    assert_eq!(sync.header_title().await, None);
    assert_eq!(sync.peer_profile().await, None);
    assert_eq!(
        sync.last_error().await,
        Some(SyncError::Refresh(DirectoryError::Http { status: 500 }))
    );
}

#[tokio::test]
async fn test_switching_peer_discards_old_response() {
    let (directory, _channel, sync) = setup();
    directory.set_history(9, Ok(history("bob", vec![message(9, ME, "from bob", "")])));

    let release = directory.hold_next_call();
    let first = tokio::spawn({
        let sync = sync.clone();
        async move { sync.open(PEER).await }
    });
    wait_until("first open in flight", SETTLE, || directory.get_calls().len() == 1).await;

    assert_eq!(sync.open(9).await, RefreshOutcome::Applied { count: 1 });
    // The first request is still outstanding
    assert!(sync.is_loading().await);
    release.send(()).unwrap();

    assert_eq!(first.await.unwrap(), RefreshOutcome::Stale);
    assert!(!sync.is_loading().await);
    assert_eq!(sync.peer().await, Some(9));
    assert_eq!(sync.header_title().await.as_deref(), Some("bob"));
    assert_eq!(sync.messages().await[0].body, "from bob");
}

#[tokio::test]
async fn test_teardown_discards_in_flight_refresh() {
    let (directory, _channel, sync) = setup();
    let release = directory.hold_next_call();
    let pending = tokio::spawn({
        let sync = sync.clone();
        async move { sync.open(PEER).await }
    });
    wait_until("open in flight", SETTLE, || directory.get_calls().len() == 1).await;

    sync.teardown();
    release.send(()).unwrap();

    assert_eq!(pending.await.unwrap(), RefreshOutcome::Discarded);
    assert!(sync.messages().await.is_empty());
    assert_eq!(sync.header_title().await, None);
}

#[tokio::test]
async fn test_bubbles() {
    let (_directory, _channel, sync) = setup();
    sync.open(PEER).await;

    let now = Utc.with_ymd_and_hms(2023, 12, 25, 17, 32, 0).unwrap();
    let bubbles = sync.bubbles(now).await;
    assert_eq!(bubbles.len(), 3);
    assert_eq!(bubbles[0].body, "third");
    assert!(!bubbles[0].is_mine);
    assert!(bubbles[1].is_mine);
    assert_eq!(bubbles[2].time_ago, "18 hours ago");
}

#[tokio::test]
async fn test_optimistic_send_until_confirmed() {
    let directory = FakeDirectory::new();
    directory.set_history(PEER, Ok(three_message_history()));
    let channel = MemoryChannel::new();
    let sync = conversation_with(&directory, &channel, options(EventMode::RefreshOnAny, true));
    sync.open(PEER).await;

    let receipt = sync.send_message("hello").await.unwrap();
    let client_ref = match receipt {
        SendReceipt::Sent { client_ref: Some(r) } => r,
        other => panic!("Expected a correlated send, got {:?}", other),
    };
    assert_eq!(channel.sent()[0].client_ref, Some(client_ref));

    let displayed = sync.displayed_messages().await;
    assert_eq!(displayed.len(), 4);
    assert!(displayed[0].pending);
    assert_eq!(displayed[0].message.body, "hello");

    // The server stores the message and echoes the ref
    let mut echoed = message(ME, PEER, "hello", "25/12/23 14:33:00");
    echoed.client_ref = Some(client_ref);
    let mut confirmed = three_message_history();
    confirmed.messages.push(echoed);
    directory.set_history(PEER, Ok(confirmed));
    sync.refresh().await;

    let displayed = sync.displayed_messages().await;
    assert_eq!(displayed.len(), 4);
    assert!(displayed.iter().all(|m| !m.pending));
    assert_eq!(sync.pending_count().await, 0);
}

#[tokio::test]
async fn test_optimistic_rollback_on_failure() {
    let directory = FakeDirectory::new();
    directory.set_history(PEER, Ok(three_message_history()));
    let channel = MemoryChannel::new();
    let sync = conversation_with(&directory, &channel, options(EventMode::RefreshOnAny, true));
    sync.open(PEER).await;
    channel.fail_sends(RealtimeError::Timeout);

    assert!(sync.send_message("hello").await.is_err());
    assert_eq!(sync.pending_count().await, 0);
    assert_eq!(sync.displayed_messages().await.len(), 3);
}

#[tokio::test]
async fn test_typed_events() {
    let directory = FakeDirectory::new();
    directory.set_history(PEER, Ok(three_message_history()));
    let channel = MemoryChannel::new();
    let sync = conversation_with(&directory, &channel, options(EventMode::Typed, false));
    sync.open(PEER).await;

    let received = InboundFrame::new(
        r#"{"type":"message_received",
            "message":{"sender_id":42,"receiver_id":7,"message":"fourth"}}"#,
    );
    assert_eq!(sync.handle_frame(&received).await, FrameOutcome::Appended);
    assert_eq!(sync.messages_newest_first().await[0].body, "fourth");

    let elsewhere = InboundFrame::new(
        r#"{"type":"message_received",
            "message":{"sender_id":9,"receiver_id":7,"message":"other chat"}}"#,
    );
    assert_eq!(sync.handle_frame(&elsewhere).await, FrameOutcome::Ignored);

    let read = InboundFrame::new(r#"{"type":"message_read","reader_id":42,"peer_id":7}"#);
    assert_eq!(
        sync.handle_frame(&read).await,
        FrameOutcome::MarkedRead { count: 1 }
    );
    let mine: Vec<bool> = sync
        .messages()
        .await
        .iter()
        .filter(|m| m.sender_id == ME)
        .map(|m| m.read)
        .collect();
    assert_eq!(mine, vec![true]);

    // Only the open call so far; unknown frames fall back to a refresh
    assert_eq!(directory.get_calls().len(), 1);
    let unknown = InboundFrame::new("ping");
    assert_matches!(
        sync.handle_frame(&unknown).await,
        FrameOutcome::Refreshed(RefreshOutcome::Applied { count: 3 })
    );
    assert_eq!(directory.get_calls().len(), 2);
}

#[tokio::test]
async fn test_typed_event_during_refresh_supersedes_it() {
    let directory = FakeDirectory::new();
    directory.set_history(PEER, Ok(three_message_history()));
    let channel = MemoryChannel::new();
    let sync = conversation_with(&directory, &channel, options(EventMode::Typed, false));
    sync.open(PEER).await;

    // This refresh has read the server before "fourth" was stored
    let release = directory.hold_next_call();
    let slow = tokio::spawn({
        let sync = sync.clone();
        async move { sync.refresh().await }
    });
    wait_until("refresh in flight", SETTLE, || directory.get_calls().len() == 2).await;

    let mut stored = three_message_history();
    stored.messages.push(message(PEER, ME, "fourth", "25/12/23 14:33:00"));
    directory.set_history(PEER, Ok(stored));

    let received = InboundFrame::new(
        r#"{"type":"message_received",
            "message":{"sender_id":42,"receiver_id":7,"message":"fourth"}}"#,
    );
    assert_eq!(
        sync.handle_frame(&received).await,
        FrameOutcome::Refreshed(RefreshOutcome::Applied { count: 4 })
    );

    release.send(()).unwrap();
    assert_eq!(slow.await.unwrap(), RefreshOutcome::Stale);

    let bodies: Vec<String> = sync.messages().await.iter().map(|m| m.body.clone()).collect();
    assert_eq!(bodies, vec!["first", "second", "third", "fourth"]);
    assert!(!sync.is_loading().await);
}
