//! Integration test: SignalDesk over the in-memory feed
//!
//! Covers the live path, the demo fallback when the feed is unreachable,
//! recovery through refresh, and teardown.

use aurum_client::{
    ClientError, ConfigError, DataSource, DeskOptions, SignalDesk, demo_signals,
    load_config_from_str,
};
use aurum_clock::ManualClock;
use aurum_core::{ConnectivityState, Signal, SignalStatus, SignalType, StatusFilter, Timestamp};
use aurum_feed::{ChannelFeed, FeedError, SessionState};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

// ============================================================================
// Test Fixtures
// ============================================================================

fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn signal(id: &str, pair: &str, status: SignalStatus, minutes_ago: i64) -> Signal {
    Signal::new(
        id,
        pair,
        SignalType::Buy,
        dec!(2345.671),
        dec!(2330),
        now() - ChronoDuration::minutes(minutes_ago),
    )
    .with_status(status)
    .with_take_profits(vec![dec!(2360)])
}

fn desk(feed: &Arc<ChannelFeed>, options: DeskOptions) -> SignalDesk {
    SignalDesk::with_clock(feed.clone(), feed.clone(), options, ManualClock::new(now()))
}

fn ids(signals: &[Signal]) -> Vec<String> {
    signals.iter().map(|s| s.id.to_string()).collect()
}

/// Wait until the desk shows `expected`
async fn wait_for_visible(desk: &SignalDesk, expected: &[&str]) {
    let mut updates = desk.updates();
    timeout(Duration::from_secs(1), async {
        while ids(&desk.visible()) != expected {
            updates.changed().await.unwrap();
        }
    })
    .await
    .expect("desk never showed the expected signals");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_live_feed_reaches_the_view() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![
        signal("xau", "XAU/USD", SignalStatus::Active, 5),
        signal("eur", "EUR/USD", SignalStatus::Closed, 90),
    ]));
    let desk = desk(&feed, DeskOptions::default());

    assert_eq!(desk.connectivity_label(), None);
    assert_eq!(desk.start().await.unwrap(), DataSource::Live);
    assert_eq!(desk.connectivity(), ConnectivityState::Connected);
    assert_eq!(desk.connectivity_label(), Some("Live Data Connected"));
    assert_eq!(ids(&desk.visible()), vec!["xau", "eur"]);

    feed.insert(signal("xag", "XAG/USD", SignalStatus::Pending, 0));
    wait_for_visible(&desk, &["xag", "xau", "eur"]).await;

    desk.set_filter(StatusFilter::Active);
    assert_eq!(ids(&desk.visible()), vec!["xau"]);
    let displays = desk.displays();
    assert_eq!(displays[0].formatted_entry, "2345.67");
    assert_eq!(displays[0].age_label, "5m ago");

    desk.set_filter(StatusFilter::All);
    assert_eq!(desk.status_counts().total(), 3);
}

#[tokio::test]
async fn test_unreachable_feed_falls_back_to_demo() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal(
        "xau",
        "XAU/USD",
        SignalStatus::Active,
        5,
    )]));
    feed.set_unavailable(true);
    let desk = desk(&feed, DeskOptions::default());

    assert_eq!(desk.start().await.unwrap(), DataSource::Demo);
    assert_eq!(desk.connectivity(), ConnectivityState::Unreachable);
    assert_eq!(desk.connectivity_label(), Some("Using Demo Data"));
    assert_eq!(desk.visible(), demo_signals(now()));
    assert_eq!(desk.session_state(), SessionState::Closed);

    // Backend recovers
    feed.set_unavailable(false);
    assert_eq!(desk.refresh().await.unwrap(), DataSource::Live);
    assert_eq!(desk.connectivity(), ConnectivityState::Connected);
    assert_eq!(ids(&desk.visible()), vec!["xau"]);
}

#[tokio::test]
async fn test_fallback_disabled_surfaces_the_error() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::new());
    feed.set_unavailable(true);
    let desk = desk(
        &feed,
        DeskOptions {
            demo_fallback: false,
            ..DeskOptions::default()
        },
    );

    assert!(matches!(
        desk.start().await,
        Err(ClientError::Feed(FeedError::Unavailable(_)))
    ));
    assert!(desk.visible().is_empty());
    assert_eq!(desk.source(), DataSource::NotStarted);
}

#[tokio::test]
async fn test_refresh_leaves_live_session_alone() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal(
        "xau",
        "XAU/USD",
        SignalStatus::Active,
        5,
    )]));
    let desk = desk(&feed, DeskOptions::default());
    desk.start().await.unwrap();
    let mut session = desk.watch_session();
    session.borrow_and_update();

    assert_eq!(desk.refresh().await.unwrap(), DataSource::Live);

    assert!(!session.has_changed().unwrap());
    assert_eq!(feed.open_channels(), 1);
}

#[tokio::test]
async fn test_refresh_resubscribes_after_drop() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal(
        "xau",
        "XAU/USD",
        SignalStatus::Active,
        5,
    )]));
    let desk = desk(&feed, DeskOptions::default());
    desk.start().await.unwrap();

    let mut session = desk.watch_session();
    feed.disconnect();
    timeout(
        Duration::from_secs(1),
        session.wait_for(|state| *state == SessionState::Dropped),
    )
    .await
    .unwrap()
    .unwrap();

    // Stale snapshot stays visible while dropped
    assert_eq!(ids(&desk.visible()), vec!["xau"]);
    assert_eq!(desk.source(), DataSource::Stale);

    feed.insert(signal("xag", "XAG/USD", SignalStatus::Pending, 0));
    assert_eq!(desk.refresh().await.unwrap(), DataSource::Live);
    assert_eq!(desk.session_state(), SessionState::Live);
    assert_eq!(ids(&desk.visible()), vec!["xag", "xau"]);
}

#[tokio::test]
async fn test_stop_keeps_last_view() {
    let _ = env_logger::try_init();

    let feed = Arc::new(ChannelFeed::seeded(vec![signal(
        "xau",
        "XAU/USD",
        SignalStatus::Active,
        5,
    )]));
    let desk = desk(&feed, DeskOptions::default());
    desk.start().await.unwrap();

    desk.stop();
    desk.stop();

    assert_eq!(desk.session_state(), SessionState::Closed);
    assert_eq!(desk.source(), DataSource::Stale);
    assert_eq!(ids(&desk.visible()), vec!["xau"]);
}

#[test]
fn test_supabase_desk_requires_project_settings() {
    let mut config = load_config_from_str(r#"{ "demo_fallback": false }"#).unwrap();
    assert!(matches!(
        SignalDesk::connect_supabase(&config),
        Err(ClientError::Config(ConfigError::MissingSupabaseUrl))
    ));

    config.supabase.url = Some("https://project.supabase.co".to_string());
    assert!(matches!(
        SignalDesk::connect_supabase(&config),
        Err(ClientError::Config(ConfigError::MissingSupabaseKey))
    ));

    config.supabase.url = Some("not a url".to_string());
    config.supabase.anon_key = Some("anon-key".to_string());
    assert!(matches!(
        SignalDesk::connect_supabase(&config),
        Err(ClientError::Supabase(_))
    ));

    config.supabase.url = Some("https://project.supabase.co".to_string());
    let desk = SignalDesk::connect_supabase(&config).unwrap();
    assert_eq!(desk.source(), DataSource::NotStarted);
    assert_eq!(desk.connectivity(), ConnectivityState::Unknown);
}
