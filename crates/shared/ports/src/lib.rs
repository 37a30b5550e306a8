//! Aurum Ports
//!
//! Port definitions (traits) for the Aurum signal client.
//! These define the boundaries between the synchronization core and the
//! transports that actually talk to a backend.

mod clock;
mod error;
mod feed;
mod health;

pub use clock::Clock;
pub use error::{TransportError, TransportResult};
pub use feed::{ChangeStream, SignalFeed};
pub use health::HealthCheck;
