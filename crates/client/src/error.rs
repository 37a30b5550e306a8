//! Error types for the client crate

use crate::config::ConfigError;
use aurum_feed::FeedError;
use aurum_supabase::SupabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Supabase error: {0}")]
    Supabase(#[from] SupabaseError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
