use serde::{Deserialize, Serialize};

/// Reachability of the backing data service, as last reported by a probe
///
/// `Unknown` only holds before the first probe resolves. Consumers should
/// render no connectivity indicator at all while it is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    #[default]
    Unknown,
    Connected,
    Unreachable,
}

impl ConnectivityState {
    /// State after a probe with the given outcome
    pub fn from_probe(reachable: bool) -> Self {
        if reachable {
            ConnectivityState::Connected
        } else {
            ConnectivityState::Unreachable
        }
    }

    /// Returns true once at least one probe has resolved
    pub fn is_known(&self) -> bool {
        !matches!(self, ConnectivityState::Unknown)
    }

    /// Returns true if the last probe reached the backend
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityState::Connected)
    }
}
