//! Aurum Signal View Model
//!
//! Sits between the feed session and the presentation layer:
//! - holds the latest ordered snapshot verbatim,
//! - applies the status filter lazily at read time,
//! - derives display strings (prices, age, PnL) from a record and `now`.
//!
//! Nothing in here mutates a [`Signal`](aurum_core::Signal) or performs I/O.

pub mod display;
pub mod format;
pub mod model;

pub use display::{PnlSign, SignalDisplay};
pub use format::{age_label, format_pnl, format_price, price_precision};
pub use model::{SignalViewModel, StatusCounts};
