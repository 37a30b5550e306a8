//! Aurum Core Domain
//!
//! Pure domain types for the Aurum signal client: signal records, the
//! change events that mutate a snapshot of them, and the small state enums
//! shared by the feed session, view model and connectivity prober.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    ConnectivityState, FeedEvent, Signal, SignalId, SignalStatus, SignalType, StatusFilter,
};
pub use values::{Price, Timestamp};
