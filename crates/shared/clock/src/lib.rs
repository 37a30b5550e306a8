//! Aurum Clock Infrastructure
//!
//! Time sources for deriving signal ages:
//!
//! - [`SystemClock`]: wall-clock time for production
//! - [`ManualClock`]: frozen time that only moves when told to, for
//!   deterministic tests of "time ago" labels
//!
//! ## Usage
//!
//! ```ignore
//! use aurum_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::new(signal.timestamp);
//! clock.advance(Duration::minutes(5));
//! assert_eq!(view.derive(&signal, clock.now()).age_label, "5m ago");
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use aurum_ports::Clock;
