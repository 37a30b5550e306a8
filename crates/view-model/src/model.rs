//! Signal view model
//!
//! Holds the snapshot exactly as the session delivered it and a status
//! filter. The visible sequence is recomputed from both on every read, so
//! switching filters back and forth always gives back the original order.

use crate::display::SignalDisplay;
use aurum_core::{Signal, SignalStatus, StatusFilter, Timestamp};
use serde::Serialize;

/// Number of signals per status, for filter badges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub active: usize,
    pub closed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.active + self.closed
    }

    /// Count matching `filter`
    pub fn for_filter(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.total(),
            StatusFilter::Pending => self.pending,
            StatusFilter::Active => self.active,
            StatusFilter::Closed => self.closed,
        }
    }
}

/// Filtered, derived view over the latest snapshot
#[derive(Debug, Clone, Default)]
pub struct SignalViewModel {
    signals: Vec<Signal>,
    filter: StatusFilter,
}

impl SignalViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `filter` already selected
    pub fn with_filter(filter: StatusFilter) -> Self {
        Self {
            signals: Vec::new(),
            filter,
        }
    }

    /// Replace the held sequence; order is kept as given
    pub fn replace_snapshot(&mut self, signals: Vec<Signal>) {
        self.signals = signals;
    }

    /// Change the status filter. Never touches the held snapshot.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// The held sequence, unfiltered
    pub fn all(&self) -> &[Signal] {
        &self.signals
    }

    /// Signals matching the current filter, in snapshot order
    pub fn visible(&self) -> Vec<&Signal> {
        self.signals
            .iter()
            .filter(|signal| self.filter.matches(signal))
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.signals
            .iter()
            .fold(StatusCounts::default(), |mut counts, signal| {
                match signal.status {
                    SignalStatus::Pending => counts.pending += 1,
                    SignalStatus::Active => counts.active += 1,
                    SignalStatus::Closed => counts.closed += 1,
                }
                counts
            })
    }

    /// Display fields for one record as seen at `now`
    pub fn derive(&self, signal: &Signal, now: Timestamp) -> SignalDisplay {
        SignalDisplay::derive(signal, now)
    }

    /// Display fields for every visible record
    pub fn derive_visible(&self, now: Timestamp) -> Vec<SignalDisplay> {
        self.visible()
            .into_iter()
            .map(|signal| SignalDisplay::derive(signal, now))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
