//! Tokio channel-based signal feed for single-process mode
//!
//! Keeps the "table" in memory and fans change events out to every open
//! channel through a broadcast channel. Used for tests, offline demos, and
//! anything that wants a feed without a backend.

use crate::snapshot::SignalSnapshot;
use async_trait::async_trait;
use aurum_core::{FeedEvent, Signal, SignalId};
use aurum_ports::{ChangeStream, HealthCheck, SignalFeed, TransportError, TransportResult};
use log::warn;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

/// Default broadcast capacity per feed
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
enum ChannelMessage {
    Event(FeedEvent),
    Disconnect,
}

/// In-memory signal table with a live change channel
pub struct ChannelFeed {
    table: Mutex<SignalSnapshot>,
    tx: broadcast::Sender<ChannelMessage>,
    unavailable: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
}

impl ChannelFeed {
    /// Create an empty feed
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty feed with a custom broadcast capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            table: Mutex::new(SignalSnapshot::new()),
            tx,
            unavailable: AtomicBool::new(false),
            fetch_delay: Mutex::new(None),
        }
    }

    /// Create a feed whose table starts with `signals`
    pub fn seeded(signals: impl IntoIterator<Item = Signal>) -> Self {
        let feed = Self::new();
        feed.table.lock().seed(signals);
        feed
    }

    /// Apply an event to the table and deliver it to every open channel
    pub fn publish(&self, event: FeedEvent) {
        self.table.lock().apply(event.clone());
        // No open channel is fine
        let _ = self.tx.send(ChannelMessage::Event(event));
    }

    pub fn insert(&self, signal: Signal) {
        self.publish(FeedEvent::Insert(signal));
    }

    pub fn update(&self, signal: Signal) {
        self.publish(FeedEvent::Update(signal));
    }

    pub fn delete(&self, id: impl Into<SignalId>) {
        self.publish(FeedEvent::Delete(id.into()));
    }

    /// Terminate every open channel, as a backend restart would
    pub fn disconnect(&self) {
        let _ = self.tx.send(ChannelMessage::Disconnect);
    }

    /// Make channel opens and reads fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every snapshot read, to exercise cancellation while connecting
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.lock() = delay;
    }

    /// Number of channels currently open
    pub fn open_channels(&self) -> usize {
        self.tx.receiver_count()
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }
}

impl Default for ChannelFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalFeed for ChannelFeed {
    async fn fetch_all(&self) -> TransportResult<Vec<Signal>> {
        let delay = *self.fetch_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.is_unavailable() {
            return Err(TransportError::Request("feed unavailable".to_string()));
        }
        Ok(self.table.lock().ordered())
    }

    async fn open_channel(&self) -> TransportResult<Box<dyn ChangeStream>> {
        if self.is_unavailable() {
            return Err(TransportError::Connection("feed unavailable".to_string()));
        }
        Ok(Box::new(ChannelStream {
            rx: Some(self.tx.subscribe()),
        }))
    }

    fn name(&self) -> &str {
        "ChannelFeed"
    }
}

#[async_trait]
impl HealthCheck for ChannelFeed {
    async fn ping(&self) -> TransportResult<()> {
        if self.is_unavailable() {
            return Err(TransportError::Connection("feed unavailable".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ChannelFeed"
    }
}

/// Change stream over the feed's broadcast channel
pub struct ChannelStream {
    rx: Option<broadcast::Receiver<ChannelMessage>>,
}

#[async_trait]
impl ChangeStream for ChannelStream {
    async fn next(&mut self) -> TransportResult<FeedEvent> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(TransportError::ChannelClosed);
        };
        match rx.recv().await {
            Ok(ChannelMessage::Event(event)) => Ok(event),
            Ok(ChannelMessage::Disconnect) | Err(broadcast::error::RecvError::Closed) => {
                self.rx = None;
                Err(TransportError::ChannelClosed)
            }
            // Missed events cannot be replayed; the subscriber has to reseed
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Channel stream lagged by {} events, closing", skipped);
                self.rx = None;
                Err(TransportError::ChannelClosed)
            }
        }
    }

    async fn close(&mut self) {
        self.rx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum_core::SignalType;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn signal(id: &str) -> Signal {
        Signal::new(
            id,
            "XAG/USD",
            SignalType::Sell,
            dec!(29.45),
            dec!(30.1),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_publish_reaches_open_channel() {
        let feed = ChannelFeed::new();
        let mut stream = feed.open_channel().await.unwrap();

        feed.insert(signal("a"));

        let event = stream.next().await.unwrap();
        assert_eq!(event.signal_id().as_str(), "a");
        assert_eq!(feed.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_ends_stream() {
        let feed = ChannelFeed::new();
        let mut stream = feed.open_channel().await.unwrap();

        feed.disconnect();

        assert_eq!(stream.next().await, Err(TransportError::ChannelClosed));
        assert_eq!(stream.next().await, Err(TransportError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_lagging_stream_closes() {
        let feed = ChannelFeed::with_capacity(2);
        let mut stream = feed.open_channel().await.unwrap();

        for id in ["a", "b", "c", "d", "e"] {
            feed.insert(signal(id));
        }

        assert_eq!(stream.next().await, Err(TransportError::ChannelClosed));
        assert_eq!(feed.open_channels(), 0);
    }

    #[tokio::test]
    async fn test_close_releases_receiver() {
        let feed = ChannelFeed::new();
        let mut stream = feed.open_channel().await.unwrap();
        assert_eq!(feed.open_channels(), 1);

        stream.close().await;
        assert_eq!(feed.open_channels(), 0);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let feed = ChannelFeed::seeded(vec![signal("a")]);
        feed.set_unavailable(true);

        assert!(feed.open_channel().await.is_err());
        assert!(feed.fetch_all().await.is_err());
        assert!(feed.ping().await.is_err());

        feed.set_unavailable(false);
        assert_eq!(feed.fetch_all().await.unwrap().len(), 1);
    }
}
