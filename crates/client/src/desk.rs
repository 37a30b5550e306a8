//! Signal desk
//!
//! Wires the three core components together the way a screen uses them:
//!
//! ```text
//!  ConnectivityProber ──► connectivity flag
//!  FeedSession ──► snapshot listener ──► SignalViewModel ──► visible / displays
//!        │
//!        └── unavailable ──► demo dataset (when enabled)
//! ```

use crate::config::ClientConfig;
use crate::demo::demo_signals;
use crate::error::Result;
use aurum_clock::SystemClock;
use aurum_core::{ConnectivityState, Signal, StatusFilter};
use aurum_feed::{FeedError, FeedSession, SessionState, SnapshotListener, Subscription};
use aurum_ports::{Clock, HealthCheck, SignalFeed};
use aurum_prober::{ConnectivityProber, ProberConfig};
use aurum_supabase::SupabaseFeed;
use aurum_view::{SignalDisplay, SignalViewModel, StatusCounts};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::watch;

/// Where the signals currently shown come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// `start` has not run yet
    NotStarted,
    /// The live feed
    Live,
    /// The last live snapshot, kept after the session dropped or stopped
    Stale,
    /// The bundled demo dataset
    Demo,
}

/// Desk options
#[derive(Debug, Clone)]
pub struct DeskOptions {
    pub prober: ProberConfig,
    /// Fall back to the demo dataset when the feed is unavailable
    pub demo_fallback: bool,
    pub initial_filter: StatusFilter,
}

impl Default for DeskOptions {
    fn default() -> Self {
        Self {
            prober: ProberConfig::default(),
            demo_fallback: true,
            initial_filter: StatusFilter::All,
        }
    }
}

impl From<&ClientConfig> for DeskOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            prober: config.prober_config(),
            demo_fallback: config.demo_fallback,
            initial_filter: config.initial_filter,
        }
    }
}

/// Client facade over feed session, view model and connectivity prober
pub struct SignalDesk {
    session: FeedSession,
    prober: ConnectivityProber,
    view: Arc<RwLock<SignalViewModel>>,
    clock: Arc<dyn Clock>,
    subscription: Mutex<Option<Subscription>>,
    source: Mutex<DataSource>,
    /// Bumped on every snapshot reaching the view model
    updates_tx: Arc<watch::Sender<u64>>,
    demo_fallback: bool,
}

impl SignalDesk {
    pub fn new(
        feed: Arc<dyn SignalFeed>,
        health: Arc<dyn HealthCheck>,
        options: DeskOptions,
    ) -> Self {
        Self::with_clock(feed, health, options, Arc::new(SystemClock::new()))
    }

    /// Desk over the Supabase project named in `config`.
    ///
    /// Fails if the project URL or key is missing or the HTTP client
    /// cannot be built. Nothing is contacted until [`SignalDesk::start`].
    pub fn connect_supabase(config: &ClientConfig) -> Result<Self> {
        let feed = Arc::new(SupabaseFeed::new(config.supabase_config()?)?);
        Ok(Self::new(feed.clone(), feed, DeskOptions::from(config)))
    }

    /// Use `clock` for age labels and demo timestamps
    pub fn with_clock(
        feed: Arc<dyn SignalFeed>,
        health: Arc<dyn HealthCheck>,
        options: DeskOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (updates_tx, _) = watch::channel(0);
        Self {
            session: FeedSession::new(feed),
            prober: ConnectivityProber::with_clock(health, options.prober, clock.clone()),
            view: Arc::new(RwLock::new(SignalViewModel::with_filter(
                options.initial_filter,
            ))),
            clock,
            subscription: Mutex::new(None),
            source: Mutex::new(DataSource::NotStarted),
            updates_tx: Arc::new(updates_tx),
            demo_fallback: options.demo_fallback,
        }
    }

    /// Check connectivity once, then subscribe to the feed.
    ///
    /// Falls back to the demo dataset when the feed is unavailable and the
    /// fallback is enabled; otherwise the subscribe error is returned.
    pub async fn start(&self) -> Result<DataSource> {
        let connectivity = self.prober.check().await;
        info!("Initial connectivity: {:?}", connectivity);
        self.connect().await
    }

    /// Re-check connectivity and resubscribe if the backend is back.
    ///
    /// A live session is left alone: it already keeps the view current.
    pub async fn refresh(&self) -> Result<DataSource> {
        let connectivity = self.prober.check().await;
        if connectivity.is_connected() && self.session.state() != SessionState::Live {
            info!("Backend reachable again, resubscribing");
            return self.connect().await;
        }
        Ok(self.source())
    }

    async fn connect(&self) -> Result<DataSource> {
        let view = self.view.clone();
        let updates = self.updates_tx.clone();
        let listener: SnapshotListener = Box::new(move |signals: &[Signal]| {
            view.write().replace_snapshot(signals.to_vec());
            updates.send_modify(|version| *version += 1);
        });

        match self.session.subscribe(listener).await {
            Ok(subscription) => {
                *self.subscription.lock() = Some(subscription);
                self.set_source(DataSource::Live);
                Ok(DataSource::Live)
            }
            Err(FeedError::Unavailable(e)) if self.demo_fallback => {
                warn!("Signal feed unavailable ({}), showing demo data", e);
                self.load_demo();
                Ok(DataSource::Demo)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load_demo(&self) {
        self.view
            .write()
            .replace_snapshot(demo_signals(self.clock.now()));
        self.updates_tx.send_modify(|version| *version += 1);
        self.set_source(DataSource::Demo);
    }

    fn set_source(&self, source: DataSource) {
        *self.source.lock() = source;
    }

    /// Tear the live session down. The view keeps its last snapshot.
    pub fn stop(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }
        self.session.unsubscribe();
    }

    pub fn set_filter(&self, filter: StatusFilter) {
        self.view.write().set_filter(filter);
        self.updates_tx.send_modify(|version| *version += 1);
    }

    pub fn filter(&self) -> StatusFilter {
        self.view.read().filter()
    }

    /// Signals passing the current filter, in snapshot order
    pub fn visible(&self) -> Vec<Signal> {
        self.view.read().visible().into_iter().cloned().collect()
    }

    /// Display fields for the visible signals, aged against the desk clock
    pub fn displays(&self) -> Vec<SignalDisplay> {
        self.view.read().derive_visible(self.clock.now())
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.view.read().status_counts()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.prober.state()
    }

    /// Banner text for the connectivity flag; `None` until the first check
    pub fn connectivity_label(&self) -> Option<&'static str> {
        match self.prober.state() {
            ConnectivityState::Unknown => None,
            ConnectivityState::Connected => Some("Live Data Connected"),
            ConnectivityState::Unreachable => Some("Using Demo Data"),
        }
    }

    pub fn is_checking(&self) -> bool {
        self.prober.is_checking()
    }

    /// Where the shown signals come from; a live source whose session is no
    /// longer live reads as [`DataSource::Stale`]
    pub fn source(&self) -> DataSource {
        match *self.source.lock() {
            DataSource::Live if self.session.state() != SessionState::Live => DataSource::Stale,
            source => source,
        }
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn watch_session(&self) -> watch::Receiver<SessionState> {
        self.session.watch_state()
    }

    /// Changes whenever the visible content may have changed
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.updates_tx.subscribe()
    }
}

impl Drop for SignalDesk {
    fn drop(&mut self) {
        self.stop();
    }
}
