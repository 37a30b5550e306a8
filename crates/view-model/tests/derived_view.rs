//! Integration test: SignalViewModel driven by a manual clock
//!
//! Age labels must follow the clock while every other derived field stays
//! put, and filtering must never disturb the snapshot.

use aurum_clock::{Clock, ManualClock};
use aurum_core::{Signal, SignalStatus, SignalType, StatusFilter};
use aurum_view::{PnlSign, SignalViewModel};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn snapshot(issued_at: chrono::DateTime<Utc>) -> Vec<Signal> {
    vec![
        Signal::new(
            "xau-1",
            "XAU/USD",
            SignalType::Buy,
            dec!(2345.671),
            dec!(2330),
            issued_at,
        )
            .with_status(SignalStatus::Active)
            .with_take_profits(vec![dec!(2360), dec!(2375)])
            .with_current_price(dec!(2351.2))
            .with_pnl(dec!(57)),
        Signal::new(
            "eur-1",
            "EUR/USD",
            SignalType::Sell,
            dec!(1.08672),
            dec!(1.0912),
            issued_at,
        )
            .with_status(SignalStatus::Closed)
            .with_take_profits(vec![dec!(1.0825), dec!(1.079)])
            .with_pnl(dec!(-3.2)),
    ]
}

#[test]
fn test_age_labels_follow_the_clock() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let mut model = SignalViewModel::new();
    model.replace_snapshot(snapshot(start));

    let ages = |model: &SignalViewModel| -> Vec<String> {
        model
            .derive_visible(clock.now())
            .into_iter()
            .map(|d| d.age_label)
            .collect()
    };

    clock.advance(Duration::seconds(30));
    assert_eq!(ages(&model), vec!["Just now", "Just now"]);

    clock.set_time(start + Duration::minutes(5));
    assert_eq!(ages(&model), vec!["5m ago", "5m ago"]);

    clock.set_time(start + Duration::hours(3));
    assert_eq!(ages(&model), vec!["3h ago", "3h ago"]);

    clock.set_time(start + Duration::days(2));
    assert_eq!(ages(&model), vec!["2d ago", "2d ago"]);
}

#[test]
fn test_filtered_derivation() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let clock = ManualClock::new(start + Duration::minutes(1));
    let mut model = SignalViewModel::new();
    let original = snapshot(start);
    model.replace_snapshot(original.clone());

    model.set_filter(StatusFilter::Active);
    let displays = model.derive_visible(clock.now());
    assert_eq!(displays.len(), 1);
    assert_eq!(displays[0].formatted_entry, "2345.67");
    assert_eq!(displays[0].take_profit_line, "2360.00 | 2375.00");
    assert_eq!(displays[0].pnl_sign, Some(PnlSign::Profit));
    assert_eq!(displays[0].formatted_pnl.as_deref(), Some("+$57.00"));

    model.set_filter(StatusFilter::Closed);
    let displays = model.derive_visible(clock.now());
    assert_eq!(displays.len(), 1);
    assert_eq!(displays[0].formatted_entry, "1.0867");
    assert_eq!(displays[0].take_profit_line, "1.0825 | 1.0790");
    assert_eq!(displays[0].pnl_sign, Some(PnlSign::Loss));

    model.set_filter(StatusFilter::All);
    assert_eq!(model.all(), original.as_slice());
}
