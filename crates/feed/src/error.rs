//! Error types for the feed crate

use aurum_ports::TransportError;
use thiserror::Error;

/// Feed session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Channel open or initial fetch failed while subscribing
    #[error("Signal feed unavailable: {0}")]
    Unavailable(TransportError),

    /// An established channel terminated
    #[error("Signal feed dropped: {0}")]
    Dropped(TransportError),

    /// The subscribe call was superseded by an unsubscribe or a newer
    /// subscribe before it completed
    #[error("Subscription cancelled before it went live")]
    Cancelled,
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;
