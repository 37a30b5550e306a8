//! Aurum Connectivity Prober
//!
//! Answers one question: can the backend be reached right now?
//!
//! A check is a single call through the [`HealthCheck`](aurum_ports::HealthCheck)
//! port, bounded by a timeout. The outcome overwrites a tri-state
//! [`ConnectivityState`](aurum_core::ConnectivityState); failures never
//! surface as errors. There is no polling loop: checks run when asked.

mod error;
pub mod prober;

pub use prober::{ConnectivityProber, DEFAULT_PROBE_TIMEOUT, ProberConfig};
