//! Aurum Signal Feed
//!
//! Keeps a local copy of the signal table consistent with a live feed:
//!
//! - [`FeedSession`] opens the change channel, seeds the snapshot with a full
//!   read, and hands the complete ordered sequence to a single listener after
//!   every change.
//! - [`SignalSnapshot`] is the id-keyed table the session mutates.
//! - [`ChannelFeed`] is an in-memory transport for tests and offline demos.

pub mod channel;
pub mod error;
pub mod session;
pub mod snapshot;

pub use channel::ChannelFeed;
pub use error::{FeedError, FeedResult};
pub use session::{FeedSession, SessionState, SnapshotListener, Subscription};
pub use snapshot::{SignalSnapshot, newest_first};
