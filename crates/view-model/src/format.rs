//! Display formatting helpers

use aurum_core::{Price, Timestamp};
use rust_decimal::RoundingStrategy;

/// Decimal places used when quoting `pair`
///
/// Gold and silver quote with 2 decimals, everything else with 4.
pub fn price_precision(pair: &str) -> u32 {
    if pair.contains("XAU") || pair.contains("XAG") {
        2
    } else {
        4
    }
}

/// Format a price with the precision of its pair, rounding half away from zero
pub fn format_price(price: Price, pair: &str) -> String {
    let dp = price_precision(pair);
    let rounded = price.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Relative age of `timestamp` at `now`
///
/// Buckets use floor division: under a minute is "Just now", then minutes,
/// hours and days. Timestamps in the future also read "Just now".
pub fn age_label(timestamp: Timestamp, now: Timestamp) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let days = elapsed.num_days();
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}

/// Dollar PnL with an explicit plus sign for gains: "+$12.50", "$-3.20"
pub fn format_pnl(pnl: Price) -> String {
    let sign = if pnl.is_sign_negative() && !pnl.is_zero() {
        ""
    } else {
        "+"
    };
    let rounded = pnl.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}${:.2}", sign, rounded)
}
