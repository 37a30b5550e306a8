//! Aurum Client
//!
//! Application layer of the Aurum signal client: the [`SignalDesk`] facade
//! that a screen (or the `aurum` binary) drives, configuration loading, and
//! the demo dataset shown when the live feed is out of reach.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aurum_client::{SignalDesk, DeskOptions};
//! use aurum_supabase::SupabaseFeed;
//!
//! let feed = Arc::new(SupabaseFeed::from_env()?);
//! let desk = SignalDesk::new(feed.clone(), feed, DeskOptions::default());
//!
//! desk.start().await?;
//! for display in desk.displays() {
//!     println!("{} {} {}", display.pair, display.side_label, display.age_label);
//! }
//! ```

pub mod config;
pub mod demo;
pub mod desk;
pub mod error;

pub use config::{ClientConfig, ConfigError, load_config, load_config_from_str};
pub use demo::demo_signals;
pub use desk::{DataSource, DeskOptions, SignalDesk};
pub use error::{ClientError, Result};
