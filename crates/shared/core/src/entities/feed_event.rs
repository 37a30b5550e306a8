use serde::{Deserialize, Serialize};

use super::{Signal, SignalId};

/// Row-level change delivered by the signal feed
///
/// Inserts and updates carry the full record; the record replaces any
/// previous one with the same id wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent {
    Insert(Signal),
    Update(Signal),
    Delete(SignalId),
}

impl FeedEvent {
    /// Id of the signal this event touches
    pub fn signal_id(&self) -> &SignalId {
        match self {
            FeedEvent::Insert(signal) | FeedEvent::Update(signal) => &signal.id,
            FeedEvent::Delete(id) => id,
        }
    }

    /// Short event name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Insert(_) => "insert",
            FeedEvent::Update(_) => "update",
            FeedEvent::Delete(_) => "delete",
        }
    }
}
