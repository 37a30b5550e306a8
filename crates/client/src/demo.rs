//! Bundled demo signals
//!
//! Shown when the live feed cannot be reached, and fed through an in-memory
//! feed by `aurum --demo`. Prices track the market overview quotes.

use aurum_core::{Signal, SignalStatus, SignalType, Timestamp};
use aurum_feed::newest_first;
use chrono::Duration;
use rust_decimal_macros::dec;

/// Demo dataset with timestamps relative to `now`, newest first
pub fn demo_signals(now: Timestamp) -> Vec<Signal> {
    let mut signals = vec![
        Signal::new(
            "demo-xau-1",
            "XAU/USD",
            SignalType::Buy,
            dec!(2338.50),
            dec!(2325.00),
            now - Duration::minutes(25),
        )
        .with_status(SignalStatus::Active)
        .with_current_price(dec!(2345.67))
        .with_take_profits(vec![dec!(2352.00), dec!(2365.00), dec!(2380.00)])
        .with_accuracy(dec!(87))
        .with_risk_reward("1:2.5")
        .with_pnl(dec!(71.70))
        .with_description("Breakout above the Asian session high"),
        Signal::new(
            "demo-xag-1",
            "XAG/USD",
            SignalType::Sell,
            dec!(29.80),
            dec!(30.15),
            now - Duration::hours(2),
        )
        .with_status(SignalStatus::Active)
        .with_current_price(dec!(29.45))
        .with_take_profits(vec![dec!(29.20), dec!(28.90)])
        .with_accuracy(dec!(82))
        .with_risk_reward("1:2")
        .with_pnl(dec!(35.00)),
        Signal::new(
            "demo-eur-1",
            "EUR/USD",
            SignalType::Buy,
            dec!(1.0840),
            dec!(1.0810),
            now - Duration::hours(27),
        )
        .with_status(SignalStatus::Closed)
        .with_take_profits(vec![dec!(1.0880), dec!(1.0910)])
        .with_accuracy(dec!(79))
        .with_risk_reward("1:1.8")
        .with_pnl(dec!(40.00)),
        Signal::new(
            "demo-gbp-1",
            "GBP/USD",
            SignalType::Sell,
            dec!(1.2660),
            dec!(1.2695),
            now - Duration::days(2),
        )
        .with_status(SignalStatus::Closed)
        .with_take_profits(vec![dec!(1.2610)])
        .with_accuracy(dec!(74))
        .with_risk_reward("1:1.4")
        .with_pnl(dec!(-35.00)),
        Signal::new(
            "demo-jpy-1",
            "USD/JPY",
            SignalType::Buy,
            dec!(149.50),
            dec!(149.00),
            now - Duration::minutes(10),
        )
        .with_take_profits(vec![dec!(150.20), dec!(150.80)])
        .with_accuracy(dec!(76))
        .with_risk_reward("1:1.4"),
        Signal::new(
            "demo-aud-1",
            "AUD/USD",
            SignalType::Buy,
            dec!(0.6530),
            dec!(0.6505),
            now - Duration::minutes(45),
        )
        .with_status(SignalStatus::Active)
        .with_current_price(dec!(0.6542))
        .with_take_profits(vec![dec!(0.6570)])
        .with_accuracy(dec!(71))
        .with_risk_reward("1:1.6")
        .with_pnl(dec!(12.00)),
    ];
    signals.sort_by(newest_first);
    signals
}
