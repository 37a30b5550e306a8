//! Aurum Supabase Transport
//!
//! Implements the feed and health ports against a Supabase project:
//!
//! - [`SupabaseRest`]: PostgREST reads of the signals table, and the
//!   lightweight read used as a reachability probe.
//! - [`RealtimeClient`]: Realtime websocket (Phoenix channels, v1 JSON
//!   serializer) delivering row-level changes as [`FeedEvent`](aurum_core::FeedEvent)s.
//! - [`SupabaseFeed`]: both of the above behind [`SignalFeed`](aurum_ports::SignalFeed).

pub mod config;
pub mod error;
pub mod feed;
pub mod realtime;
pub mod rest;

pub use config::SupabaseConfig;
pub use error::SupabaseError;
pub use feed::SupabaseFeed;
pub use realtime::{RealtimeClient, RealtimeStream};
pub use rest::SupabaseRest;
