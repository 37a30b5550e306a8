use aurum_core::Timestamp;
use aurum_ports::Clock;
use chrono::Duration;
use parking_lot::RwLock;
use std::sync::Arc;

/// Clock frozen at a given instant
///
/// Time only moves through [`ManualClock::advance`] or
/// [`ManualClock::set_time`], which makes age derivation reproducible.
pub struct ManualClock {
    current_time: RwLock<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `initial_time`
    pub fn new(initial_time: Timestamp) -> Arc<Self> {
        Arc::new(Self {
            current_time: RwLock::new(initial_time),
        })
    }

    /// Move the clock forward (or backward, for a negative duration)
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current_time.write();
        *current += duration;
    }

    /// Jump to an explicit instant
    pub fn set_time(&self, time: Timestamp) {
        *self.current_time.write() = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current_time.read()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
