use serde::{Deserialize, Deserializer, Serialize};

use super::{SignalStatus, SignalType};
use crate::values::{Price, Timestamp};

/// Opaque unique identifier for a signal
///
/// Stable across updates to the same logical signal. Ordered so snapshots
/// can break timestamp ties deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SignalId(pub String);

impl SignalId {
    /// Create a new signal ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SignalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SignalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// Tables keyed by a bigint serial deliver numeric ids.
impl<'de> Deserialize<'de> for SignalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => SignalId(s),
            RawId::Int(n) => SignalId(n.to_string()),
        })
    }
}

/// A trading recommendation as stored in the `signals` table
///
/// Immutable once received: the feed replaces records wholesale and nothing
/// in this workspace mutates a field after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    /// Instrument symbol, e.g. "XAU/USD"
    pub pair: String,
    #[serde(rename = "type")]
    pub side: SignalType,
    pub entry_price: Price,
    /// Present only while the signal is live-tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Price>,
    /// Take-profit levels in feed order
    #[serde(default)]
    pub take_profit_levels: Vec<Price>,
    pub stop_loss: Price,
    pub status: SignalStatus,
    /// Historical accuracy percentage of the issuing model
    pub accuracy: Price,
    /// Creation instant, drives the "time ago" label
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Price>,
    /// Row insertion time in the backing table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Signal {
    /// Create a pending signal with no take-profit levels and zero accuracy.
    /// Use the `with_*` methods to fill in the rest.
    pub fn new(
        id: impl Into<SignalId>,
        pair: impl Into<String>,
        side: SignalType,
        entry_price: Price,
        stop_loss: Price,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            pair: pair.into(),
            side,
            entry_price,
            current_price: None,
            take_profit_levels: Vec::new(),
            stop_loss,
            status: SignalStatus::Pending,
            accuracy: Price::ZERO,
            timestamp,
            description: None,
            risk_reward: None,
            pnl: None,
            created_at: None,
        }
    }

    pub fn with_status(mut self, status: SignalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_take_profits(mut self, levels: Vec<Price>) -> Self {
        self.take_profit_levels = levels;
        self
    }

    pub fn with_current_price(mut self, price: Price) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_accuracy(mut self, accuracy: Price) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_pnl(mut self, pnl: Price) -> Self {
        self.pnl = Some(pnl);
        self
    }

    pub fn with_risk_reward(mut self, risk_reward: impl Into<String>) -> Self {
        self.risk_reward = Some(risk_reward.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
