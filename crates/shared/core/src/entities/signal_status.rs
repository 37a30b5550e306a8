use serde::{Deserialize, Serialize};

/// Signal lifecycle status
///
/// By convention a signal only moves forward: `Pending -> Active -> Closed`.
/// A record may be created directly in any state. The convention is not
/// enforced anywhere; the feed is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    /// Published but not yet triggered
    Pending,
    /// Entry triggered, levels are live-tracked
    Active,
    /// Hit a take-profit or the stop-loss, or was withdrawn
    Closed,
}

impl SignalStatus {
    /// Position in the conventional lifecycle order
    pub fn rank(&self) -> u8 {
        match self {
            SignalStatus::Pending => 0,
            SignalStatus::Active => 1,
            SignalStatus::Closed => 2,
        }
    }

    /// Returns true if moving to `next` follows the forward-only convention.
    /// Staying in the same state counts as a valid move.
    pub fn can_advance_to(&self, next: SignalStatus) -> bool {
        next.rank() >= self.rank()
    }

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Pending => "pending",
            SignalStatus::Active => "active",
            SignalStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
