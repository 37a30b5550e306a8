use serde::{Deserialize, Serialize};

use super::{Signal, SignalStatus};

/// Status filter applied by the view model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Active,
    Closed,
}

impl StatusFilter {
    /// Returns true if the signal passes this filter
    pub fn matches(&self, signal: &Signal) -> bool {
        match self.status() {
            None => true,
            Some(status) => signal.status == status,
        }
    }

    /// The status this filter selects, or `None` for `All`
    pub fn status(&self) -> Option<SignalStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(SignalStatus::Pending),
            StatusFilter::Active => Some(SignalStatus::Active),
            StatusFilter::Closed => Some(SignalStatus::Closed),
        }
    }
}

impl From<SignalStatus> for StatusFilter {
    fn from(status: SignalStatus) -> Self {
        match status {
            SignalStatus::Pending => StatusFilter::Pending,
            SignalStatus::Active => StatusFilter::Active,
            SignalStatus::Closed => StatusFilter::Closed,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "active" => Ok(StatusFilter::Active),
            "closed" => Ok(StatusFilter::Closed),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}
