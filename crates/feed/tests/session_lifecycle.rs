//! Integration test: FeedSession <-> ChannelFeed
//!
//! Drives a session through its whole lifecycle against the in-memory
//! transport: seeding, incremental events, teardown, replacement, channel
//! drops and cancellation of a pending subscribe.

use aurum_core::{Signal, SignalStatus, SignalType, Timestamp};
use aurum_feed::{ChannelFeed, FeedError, FeedSession, SessionState, SnapshotListener};
use aurum_ports::TransportError;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

// ============================================================================
// Test Fixtures
// ============================================================================

fn base_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn signal(id: &str, minutes_ago: i64) -> Signal {
    Signal::new(
        id,
        "XAU/USD",
        SignalType::Buy,
        dec!(2345.67),
        dec!(2330),
        base_time() - ChronoDuration::minutes(minutes_ago),
    )
    .with_take_profits(vec![dec!(2360), dec!(2375)])
}

/// Listener forwarding every emitted snapshot into a channel
fn recording_listener() -> (SnapshotListener, mpsc::UnboundedReceiver<Vec<Signal>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener: SnapshotListener = Box::new(move |signals: &[Signal]| {
        let _ = tx.send(signals.to_vec());
    });
    (listener, rx)
}

async fn next_emission(rx: &mut mpsc::UnboundedReceiver<Vec<Signal>>) -> Vec<Signal> {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("Timed out waiting for snapshot")
        .expect("Listener was dropped")
}

fn ids(signals: &[Signal]) -> Vec<&str> {
    signals.iter().map(|s| s.id.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_subscribe_emits_seeded_snapshot_first() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![
        signal("old", 30),
        signal("new", 1),
        signal("mid", 10),
    ]));
    let session = FeedSession::new(feed.clone());
    let (listener, mut rx) = recording_listener();

    let subscription = session.subscribe(listener).await.unwrap();

    assert_eq!(ids(&next_emission(&mut rx).await), vec!["new", "mid", "old"]);
    assert_eq!(session.state(), SessionState::Live);
    assert!(subscription.is_active());
    assert_eq!(feed.open_channels(), 1);
}

#[tokio::test]
async fn test_incremental_events_emit_full_sequence() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal("a", 5)]));
    let session = FeedSession::new(feed.clone());
    let (listener, mut rx) = recording_listener();
    session.subscribe(listener).await.unwrap();
    next_emission(&mut rx).await;

    feed.insert(signal("b", 0));
    assert_eq!(ids(&next_emission(&mut rx).await), vec!["b", "a"]);

    feed.update(signal("a", 5).with_status(SignalStatus::Active));
    let emitted = next_emission(&mut rx).await;
    assert_eq!(ids(&emitted), vec!["b", "a"]);
    assert_eq!(emitted[1].status, SignalStatus::Active);

    feed.delete("b");
    assert_eq!(ids(&next_emission(&mut rx).await), vec!["a"]);

    // Unknown id: nothing changes, the listener still hears about it
    feed.delete("zz");
    assert_eq!(ids(&next_emission(&mut rx).await), vec!["a"]);

    assert_eq!(ids(&session.snapshot()), vec!["a"]);
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal("a", 1)]));
    let session = FeedSession::new(feed.clone());

    // Before any subscribe
    session.unsubscribe();
    assert_eq!(session.state(), SessionState::Idle);

    let (listener, mut rx) = recording_listener();
    let subscription = session.subscribe(listener).await.unwrap();
    next_emission(&mut rx).await;

    subscription.unsubscribe();
    subscription.unsubscribe();
    session.unsubscribe();

    assert_eq!(session.state(), SessionState::Closed);
    assert!(session.snapshot().is_empty());
    assert!(!subscription.is_active());

    feed.insert(signal("b", 0));
    // Listener was dropped with the session
    assert_eq!(timeout(Duration::from_secs(1), rx.recv()).await, Ok(None));
}

#[tokio::test]
async fn test_second_subscribe_replaces_first_listener() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal("a", 1)]));
    let session = FeedSession::new(feed.clone());

    let (first, mut first_rx) = recording_listener();
    let first_sub = session.subscribe(first).await.unwrap();
    next_emission(&mut first_rx).await;

    let (second, mut second_rx) = recording_listener();
    let second_sub = session.subscribe(second).await.unwrap();
    assert_eq!(ids(&next_emission(&mut second_rx).await), vec!["a"]);

    feed.insert(signal("b", 0));
    assert_eq!(ids(&next_emission(&mut second_rx).await), vec!["b", "a"]);

    assert_eq!(
        timeout(Duration::from_secs(1), first_rx.recv()).await,
        Ok(None)
    );

    // The superseded handle must not tear down the new session
    first_sub.unsubscribe();
    assert!(!first_sub.is_active());
    assert!(second_sub.is_active());
    assert_eq!(session.state(), SessionState::Live);
}

#[tokio::test]
async fn test_subscribe_failure_reports_unavailable() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal("a", 1)]));
    feed.set_unavailable(true);
    let session = FeedSession::new(feed.clone());
    let (listener, mut rx) = recording_listener();

    let result = session.subscribe(listener).await;

    assert!(matches!(
        result,
        Err(FeedError::Unavailable(TransportError::Connection(_)))
    ));
    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(session.last_error(), Some(FeedError::Unavailable(_))));
    assert_eq!(feed.open_channels(), 0);
    assert_eq!(rx.recv().await, None);

    // Feed comes back, subscribe again
    feed.set_unavailable(false);
    let (listener, mut rx) = recording_listener();
    session.subscribe(listener).await.unwrap();
    assert_eq!(ids(&next_emission(&mut rx).await), vec!["a"]);
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn test_channel_drop_keeps_stale_snapshot() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal("a", 2), signal("b", 1)]));
    let session = FeedSession::new(feed.clone());
    let mut state_rx = session.watch_state();
    let (listener, mut rx) = recording_listener();
    session.subscribe(listener).await.unwrap();
    next_emission(&mut rx).await;

    feed.disconnect();

    timeout(
        Duration::from_secs(1),
        state_rx.wait_for(|state| *state == SessionState::Dropped),
    )
    .await
    .expect("Session never reported the drop")
    .unwrap();

    assert_eq!(ids(&session.snapshot()), vec!["b", "a"]);
    assert_eq!(
        session.last_error(),
        Some(FeedError::Dropped(TransportError::ChannelClosed))
    );
    // No error is ever delivered to the listener; it is simply released
    assert_eq!(rx.recv().await, None);

    // Dropped sessions can be subscribed again
    let (listener, mut rx) = recording_listener();
    session.subscribe(listener).await.unwrap();
    assert_eq!(ids(&next_emission(&mut rx).await), vec!["b", "a"]);
    assert_eq!(session.state(), SessionState::Live);
}

#[tokio::test]
async fn test_lagging_channel_drops_instead_of_diverging() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::with_capacity(2));
    let session = FeedSession::new(feed.clone());
    let mut state_rx = session.watch_state();
    let (listener, mut rx) = recording_listener();
    session.subscribe(listener).await.unwrap();
    assert!(next_emission(&mut rx).await.is_empty());

    // Burst larger than the channel, published without yielding to the pump
    for (i, id) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
        feed.insert(signal(id, i as i64));
    }

    timeout(
        Duration::from_secs(1),
        state_rx.wait_for(|state| *state == SessionState::Dropped),
    )
    .await
    .expect("Lagging session stayed live")
    .unwrap();
    assert_eq!(
        session.last_error(),
        Some(FeedError::Dropped(TransportError::ChannelClosed))
    );

    // A fresh subscribe reseeds from the full table
    let (listener, mut rx) = recording_listener();
    session.subscribe(listener).await.unwrap();
    assert_eq!(
        ids(&next_emission(&mut rx).await),
        vec!["a", "b", "c", "d", "e"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unsubscribe_cancels_pending_subscribe() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal("a", 1)]));
    feed.set_fetch_delay(Some(Duration::from_secs(5)));
    let session = Arc::new(FeedSession::new(feed.clone()));
    let mut state_rx = session.watch_state();
    let (listener, mut rx) = recording_listener();

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.subscribe(listener).await.map(|_| ()) }
    });

    state_rx
        .wait_for(|state| *state == SessionState::Connecting)
        .await
        .unwrap();
    session.unsubscribe();

    assert_eq!(pending.await.unwrap(), Err(FeedError::Cancelled));
    assert_eq!(session.state(), SessionState::Closed);
    assert!(session.snapshot().is_empty());
    assert_eq!(rx.recv().await, None);

    feed.insert(signal("b", 0));
    assert_eq!(feed.open_channels(), 0);
}

#[tokio::test]
async fn test_drop_session_closes_channel() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal("a", 1)]));
    let session = FeedSession::new(feed.clone());
    let (listener, mut rx) = recording_listener();
    let subscription = session.subscribe(listener).await.unwrap();
    next_emission(&mut rx).await;

    drop(session);

    assert!(!subscription.is_active());
    assert_eq!(rx.recv().await, None);
}
