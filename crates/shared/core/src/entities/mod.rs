mod connectivity;
mod feed_event;
mod filter;
mod signal;
mod signal_status;
mod signal_type;

pub use connectivity::ConnectivityState;
pub use feed_event::FeedEvent;
pub use filter::StatusFilter;
pub use signal::{Signal, SignalId};
pub use signal_status::SignalStatus;
pub use signal_type::SignalType;
