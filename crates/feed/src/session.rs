//! Signal Feed Session
//!
//! Owns the live subscription to the signal feed:
//!
//! ```text
//!   subscribe()                       unsubscribe() / new subscribe()
//!  Idle ──────► Connecting ──────► Live ──────────────────────────► Closed
//!                   │                │                                 ▲
//!                   │ open/fetch     │ channel ended                   │
//!                   │ failed         ▼                                 │
//!                   │             Dropped ─────────────────────────────┘
//!                   └──────────────────────────────────────────────────┘
//! ```
//!
//! Every session instance is tagged with a generation number. Tearing a
//! session down bumps the generation under the lock, so a pending subscribe
//! or an event pump holding an older generation discards its work instead of
//! reaching a stale listener.

use crate::error::{FeedError, FeedResult};
use crate::snapshot::SignalSnapshot;
use aurum_core::Signal;
use aurum_ports::{ChangeStream, SignalFeed, TransportError};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::{oneshot, watch};

/// Callback receiving the full ordered snapshot after every change.
///
/// Runs while the session lock is held: it must not call back into the
/// session that invokes it.
pub type SnapshotListener = Box<dyn FnMut(&[Signal]) + Send + 'static>;

/// Lifecycle of a feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Never subscribed
    Idle,
    /// Opening the channel and reading the initial snapshot
    Connecting,
    /// Delivering snapshots to the listener
    Live,
    /// The channel ended unexpectedly; the last snapshot is kept but stale
    Dropped,
    /// Torn down by the caller, or the subscribe attempt failed
    Closed,
}

struct Inner {
    generation: u64,
    state: SessionState,
    snapshot: SignalSnapshot,
    listener: Option<SnapshotListener>,
    /// Dropping this tells the event pump to close its channel and exit
    cancel: Option<oneshot::Sender<()>>,
    last_error: Option<FeedError>,
}

impl Inner {
    fn teardown(&mut self) {
        self.generation += 1;
        self.listener = None;
        self.cancel = None;
        self.snapshot.clear();
    }

    fn emit(&mut self) {
        let ordered = self.snapshot.ordered();
        if let Some(listener) = self.listener.as_mut() {
            listener(&ordered);
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SessionState>,
}

impl Shared {
    fn set_state(&self, inner: &mut Inner, state: SessionState) {
        if inner.state != state {
            debug!("Feed session {:?} -> {:?}", inner.state, state);
            inner.state = state;
            self.state_tx.send_replace(state);
        }
    }

    /// Tear down whatever session is current. No-op when nothing is open.
    fn close_current(&self, inner: &mut Inner) -> bool {
        if matches!(inner.state, SessionState::Idle | SessionState::Closed) {
            return false;
        }
        inner.teardown();
        self.set_state(inner, SessionState::Closed);
        true
    }
}

/// Live subscription to the signal feed, holding the authoritative snapshot
///
/// At most one listener is registered at a time. A second `subscribe` tears
/// the first session down before connecting again.
pub struct FeedSession {
    feed: Arc<dyn SignalFeed>,
    shared: Arc<Shared>,
}

impl FeedSession {
    pub fn new(feed: Arc<dyn SignalFeed>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            feed,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    generation: 0,
                    state: SessionState::Idle,
                    snapshot: SignalSnapshot::new(),
                    listener: None,
                    cancel: None,
                    last_error: None,
                }),
                state_tx,
            }),
        }
    }

    /// Open the channel, seed the snapshot, and start delivering to `listener`.
    ///
    /// The seeded snapshot is delivered before this returns. Fails with
    /// [`FeedError::Unavailable`] if the channel or the initial read fails,
    /// and with [`FeedError::Cancelled`] if the session was torn down while
    /// connecting.
    pub async fn subscribe(&self, listener: SnapshotListener) -> FeedResult<Subscription> {
        let generation = {
            let mut inner = self.shared.inner.lock();
            if self.shared.close_current(&mut inner) {
                info!("Replacing active feed session");
            } else {
                inner.teardown();
            }
            inner.last_error = None;
            self.shared.set_state(&mut inner, SessionState::Connecting);
            inner.generation
        };

        info!("Subscribing to signal feed via {}", self.feed.name());

        let mut stream = match self.feed.open_channel().await {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail_connect(generation, e)),
        };

        if !self.is_current(generation) {
            stream.close().await;
            return Err(FeedError::Cancelled);
        }

        let signals = match self.feed.fetch_all().await {
            Ok(signals) => signals,
            Err(e) => {
                stream.close().await;
                return Err(self.fail_connect(generation, e));
            }
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let went_live = {
            let mut inner = self.shared.inner.lock();
            if inner.generation == generation {
                inner.snapshot.seed(signals);
                inner.listener = Some(listener);
                inner.cancel = Some(cancel_tx);
                self.shared.set_state(&mut inner, SessionState::Live);
                info!(
                    "Signal feed live with {} signals (generation {})",
                    inner.snapshot.len(),
                    generation
                );
                inner.emit();
                true
            } else {
                false
            }
        };

        if !went_live {
            stream.close().await;
            return Err(FeedError::Cancelled);
        }

        tokio::spawn(pump_events(
            Arc::downgrade(&self.shared),
            generation,
            stream,
            cancel_rx,
        ));

        Ok(Subscription {
            generation,
            shared: Arc::downgrade(&self.shared),
        })
    }

    /// Tear down the current session, if any.
    ///
    /// Closes the channel, drops the listener and discards the snapshot.
    /// Idempotent; calling it before any subscribe is a no-op. A subscribe
    /// still connecting resolves to [`FeedError::Cancelled`].
    pub fn unsubscribe(&self) {
        let mut inner = self.shared.inner.lock();
        if self.shared.close_current(&mut inner) {
            info!("Unsubscribed from signal feed");
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().state
    }

    /// Observe lifecycle changes
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    /// Current ordered snapshot (stale while `Dropped`)
    pub fn snapshot(&self) -> Vec<Signal> {
        self.shared.inner.lock().snapshot.ordered()
    }

    /// Why the last session ended or failed, if it did not end by request
    pub fn last_error(&self) -> Option<FeedError> {
        self.shared.inner.lock().last_error.clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.shared.inner.lock().generation == generation
    }

    fn fail_connect(&self, generation: u64, error: TransportError) -> FeedError {
        let mut inner = self.shared.inner.lock();
        if inner.generation != generation {
            return FeedError::Cancelled;
        }

        warn!("Signal feed unavailable: {}", error);
        let error = FeedError::Unavailable(error);
        inner.last_error = Some(error.clone());
        self.shared.set_state(&mut inner, SessionState::Closed);
        error
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Handle returned by [`FeedSession::subscribe`]
///
/// Only tears down the session it was issued for: once a newer subscribe
/// has replaced that session, `unsubscribe` on this handle does nothing.
#[derive(Debug, Clone)]
pub struct Subscription {
    generation: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Tear down the session this handle belongs to. Idempotent.
    pub fn unsubscribe(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut inner = shared.inner.lock();
        if inner.generation == self.generation && shared.close_current(&mut inner) {
            info!("Unsubscribed from signal feed (generation {})", self.generation);
        }
    }

    /// Returns true while the session this handle belongs to is live
    pub fn is_active(&self) -> bool {
        self.shared.upgrade().is_some_and(|shared| {
            let inner = shared.inner.lock();
            inner.generation == self.generation && inner.state == SessionState::Live
        })
    }
}

/// Apply channel events to the snapshot until cancelled or the channel ends
async fn pump_events(
    shared: Weak<Shared>,
    generation: u64,
    mut stream: Box<dyn ChangeStream>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    loop {
        let next = tokio::select! {
            _ = &mut cancel_rx => break,
            next = stream.next() => next,
        };

        let Some(shared) = shared.upgrade() else {
            break;
        };
        let mut inner = shared.inner.lock();
        if inner.generation != generation {
            break;
        }

        match next {
            Ok(event) => {
                let kind = event.kind();
                let id = event.signal_id().clone();
                let changed = inner.snapshot.apply(event);
                debug!("Applied {} for signal {} (changed: {})", kind, id, changed);
                inner.emit();
            }
            Err(e) => {
                warn!("Signal feed dropped: {}", e);
                inner.listener = None;
                inner.cancel = None;
                inner.last_error = Some(FeedError::Dropped(e));
                shared.set_state(&mut inner, SessionState::Dropped);
                break;
            }
        }
    }

    stream.close().await;
    debug!("Event pump for generation {} stopped", generation);
}
