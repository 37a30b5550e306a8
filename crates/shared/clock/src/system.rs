use aurum_core::Timestamp;
use aurum_ports::Clock;
use chrono::Utc;

/// Wall-clock time, what every non-test desk and prober runs on
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        SystemClock
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_utc_now() {
        let before = Utc::now();
        let reading = SystemClock::new().now();
        let after = Utc::now();

        assert!(before <= reading && reading <= after);
    }
}
