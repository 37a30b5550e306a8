//! Derived display fields for a single signal

use crate::format::{age_label, format_pnl, format_price};
use aurum_core::{Signal, SignalId, Timestamp};
use serde::Serialize;

/// Direction of a signal's realised or running PnL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PnlSign {
    /// Zero or positive
    Profit,
    Loss,
}

/// Strings the presentation layer shows for one signal
///
/// Computed on demand from a record and the current time; never stored
/// alongside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalDisplay {
    pub id: SignalId,
    pub pair: String,
    /// "BUY" or "SELL"
    pub side_label: String,
    pub age_label: String,
    pub formatted_entry: String,
    pub formatted_current: Option<String>,
    pub formatted_take_profits: Vec<String>,
    /// Take-profit levels joined for a single line, e.g. "2360.00 | 2375.00"
    pub take_profit_line: String,
    pub formatted_stop_loss: String,
    pub pnl_sign: Option<PnlSign>,
    pub formatted_pnl: Option<String>,
    /// "ACTIVE", "CLOSED" or "PENDING"
    pub status_label: String,
    /// e.g. "87% accuracy"
    pub accuracy_label: String,
    /// e.g. "R:R 1:2.5"
    pub risk_reward_label: Option<String>,
    pub description: Option<String>,
}

impl SignalDisplay {
    /// Derive every display field of `signal` as seen at `now`
    pub fn derive(signal: &Signal, now: Timestamp) -> Self {
        let pair = signal.pair.as_str();
        let formatted_take_profits: Vec<String> = signal
            .take_profit_levels
            .iter()
            .map(|level| format_price(*level, pair))
            .collect();

        Self {
            id: signal.id.clone(),
            pair: signal.pair.clone(),
            side_label: signal.side.as_str().to_string(),
            age_label: age_label(signal.timestamp, now),
            formatted_entry: format_price(signal.entry_price, pair),
            formatted_current: signal.current_price.map(|p| format_price(p, pair)),
            take_profit_line: formatted_take_profits.join(" | "),
            formatted_take_profits,
            formatted_stop_loss: format_price(signal.stop_loss, pair),
            pnl_sign: signal.pnl.map(|pnl| {
                if pnl.is_sign_negative() && !pnl.is_zero() {
                    PnlSign::Loss
                } else {
                    PnlSign::Profit
                }
            }),
            formatted_pnl: signal.pnl.map(format_pnl),
            status_label: signal.status.as_str().to_uppercase(),
            accuracy_label: format!("{}% accuracy", signal.accuracy.normalize()),
            risk_reward_label: signal.risk_reward.as_ref().map(|rr| format!("R:R {}", rr)),
            description: signal.description.clone(),
        }
    }
}
