use async_trait::async_trait;
use aurum_core::{FeedEvent, Signal};

use crate::error::TransportResult;

/// Port for a live source of signal records
///
/// Two capabilities over the backing `signals` table:
/// - a full snapshot read, ordered by creation time descending
/// - a channel of row-level insert/update/delete events
#[async_trait]
pub trait SignalFeed: Send + Sync {
    /// Read every signal, newest first
    async fn fetch_all(&self) -> TransportResult<Vec<Signal>>;

    /// Open a change channel. Events produced after this call returns are
    /// delivered by the stream in transport order.
    async fn open_channel(&self) -> TransportResult<Box<dyn ChangeStream>>;

    /// Adapter name for logging
    fn name(&self) -> &str {
        "SignalFeed"
    }
}

/// Incremental change events from an open channel
#[async_trait]
pub trait ChangeStream: Send {
    /// Wait for the next event.
    ///
    /// `Err(TransportError::ChannelClosed)` (or any other error) means the
    /// channel is finished; callers must not poll it again.
    async fn next(&mut self) -> TransportResult<FeedEvent>;

    /// Close the channel and release its resources. Idempotent.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ensure traits are object-safe
    fn _assert_feed_object_safe(_: &dyn SignalFeed) {}
    fn _assert_stream_object_safe(_: &mut dyn ChangeStream) {}
}
