//! Authoritative signal snapshot
//!
//! The session keeps one of these per live subscription. Records are keyed
//! by id; the ordered view is re-derived after every mutation so consumers
//! always receive the complete sequence, never a delta.

use aurum_core::{FeedEvent, Signal, SignalId};
use log::warn;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Mapping from signal id to the latest record received for it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSnapshot {
    signals: BTreeMap<SignalId, Signal>,
}

impl SignalSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a full read. Later duplicates of an id win.
    pub fn from_signals(signals: impl IntoIterator<Item = Signal>) -> Self {
        let mut snapshot = Self::new();
        snapshot.seed(signals);
        snapshot
    }

    /// Replace the whole content with a full read
    pub fn seed(&mut self, signals: impl IntoIterator<Item = Signal>) {
        self.signals.clear();
        for signal in signals {
            self.signals.insert(signal.id.clone(), signal);
        }
    }

    /// Apply one change event.
    ///
    /// Inserts and updates both upsert the full record; an update for an
    /// unknown id behaves like an insert. Deleting an unknown id is a no-op.
    /// Returns true if the snapshot content changed.
    pub fn apply(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::Insert(signal) | FeedEvent::Update(signal) => {
                if let Some(previous) = self.signals.get(&signal.id) {
                    if previous == &signal {
                        return false;
                    }
                    if !previous.status.can_advance_to(signal.status) {
                        warn!(
                            "Signal {} moved backwards: {} -> {}",
                            signal.id, previous.status, signal.status
                        );
                    }
                }
                self.signals.insert(signal.id.clone(), signal);
                true
            }
            FeedEvent::Delete(id) => self.signals.remove(&id).is_some(),
        }
    }

    /// Records sorted by timestamp descending, ties broken by id ascending
    pub fn ordered(&self) -> Vec<Signal> {
        let mut ordered: Vec<Signal> = self.signals.values().cloned().collect();
        ordered.sort_by(newest_first);
        ordered
    }

    /// Look up a record by id
    pub fn get(&self, id: &SignalId) -> Option<&Signal> {
        self.signals.get(id)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.signals.clear();
    }
}

/// Snapshot ordering: newest first, then id ascending for determinism
pub fn newest_first(a: &Signal, b: &Signal) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.id.cmp(&b.id))
}
