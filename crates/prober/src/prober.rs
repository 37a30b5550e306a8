//! Connectivity prober
//!
//! ```text
//!  Unknown ──ok──► Connected ◄──ok── Unreachable
//!     │                │                  ▲
//!     └──────fail──────┴───────fail───────┘
//! ```

use crate::error::ProbeError;
use aurum_clock::SystemClock;
use aurum_core::{ConnectivityState, Timestamp};
use aurum_ports::{Clock, HealthCheck};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Default upper bound on a single check
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Prober configuration
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Upper bound on one health call
    pub timeout: Duration,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Resets the in-flight flag even if the check future is dropped
struct CheckingGuard<'a>(&'a AtomicBool);

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Tri-state reachability tracker
pub struct ConnectivityProber {
    health: Arc<dyn HealthCheck>,
    clock: Arc<dyn Clock>,
    config: ProberConfig,
    state_tx: watch::Sender<ConnectivityState>,
    checking: AtomicBool,
    last_checked: Mutex<Option<Timestamp>>,
}

impl ConnectivityProber {
    pub fn new(health: Arc<dyn HealthCheck>) -> Self {
        Self::with_config(health, ProberConfig::default())
    }

    pub fn with_config(health: Arc<dyn HealthCheck>, config: ProberConfig) -> Self {
        Self::with_clock(health, config, Arc::new(SystemClock::new()))
    }

    /// Use `clock` to stamp completed checks
    pub fn with_clock(
        health: Arc<dyn HealthCheck>,
        config: ProberConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectivityState::Unknown);
        Self {
            health,
            clock,
            config,
            state_tx,
            checking: AtomicBool::new(false),
            last_checked: Mutex::new(None),
        }
    }

    /// Run one bounded reachability check and record its outcome.
    ///
    /// If a check is already in flight, no second call is made and the
    /// current state is returned as is.
    pub async fn check(&self) -> ConnectivityState {
        if self
            .checking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Connectivity check already in flight");
            return self.state();
        }
        let _guard = CheckingGuard(&self.checking);

        let outcome = match tokio::time::timeout(self.config.timeout, self.health.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::from(e)),
            Err(_) => Err(ProbeError::TimedOut(self.config.timeout)),
        };

        if let Err(e) = &outcome {
            debug!("Probe via {} failed: {}", self.health.name(), e);
        }
        let state = ConnectivityState::from_probe(outcome.is_ok());

        *self.last_checked.lock() = Some(self.clock.now());

        let previous = self.state_tx.send_replace(state);
        if previous != state {
            info!("Connectivity {:?} -> {:?}", previous, state);
        }
        state
    }

    /// Latest recorded state; `Unknown` until the first check completes
    pub fn state(&self) -> ConnectivityState {
        *self.state_tx.borrow()
    }

    /// Returns false until the first check completes
    pub fn is_known(&self) -> bool {
        self.state().is_known()
    }

    /// Returns true while a check is in flight
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::SeqCst)
    }

    /// Observe state changes
    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.state_tx.subscribe()
    }

    /// When the last check completed
    pub fn last_checked(&self) -> Option<Timestamp> {
        *self.last_checked.lock()
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }
}
