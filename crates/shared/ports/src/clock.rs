use aurum_core::Timestamp;

/// Source of "now" for age labels and check stamps
///
/// Production code reads the wall clock; tests freeze time so that labels
/// like "5m ago" come out the same on every run.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Clock name for logging
    fn name(&self) -> &str {
        "Clock"
    }
}
