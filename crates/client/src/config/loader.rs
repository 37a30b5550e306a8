use aurum_core::StatusFilter;
use aurum_prober::ProberConfig;
use aurum_supabase::SupabaseConfig;
use aurum_supabase::config::{ANON_KEY_VAR, LEGACY_ANON_KEY_VAR, LEGACY_URL_VAR, URL_VAR};
use log::warn;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::types::ClientConfig;

pub const PROBE_TIMEOUT_VAR: &str = "AURUM_PROBE_TIMEOUT_MS";
pub const DEMO_FALLBACK_VAR: &str = "AURUM_DEMO_FALLBACK";
pub const FILTER_VAR: &str = "AURUM_FILTER";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Supabase URL is not configured (set AURUM_SUPABASE_URL)")]
    MissingSupabaseUrl,
    #[error("Supabase anon key is not configured (set AURUM_SUPABASE_ANON_KEY)")]
    MissingSupabaseKey,
}

/// Load client configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ClientConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<ClientConfig, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

impl ClientConfig {
    /// Override fields from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Override fields from `lookup`; unparseable values are logged and skipped
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |primary: &str, legacy: &str| {
            lookup(primary)
                .or_else(|| lookup(legacy))
                .filter(|value| !value.trim().is_empty())
        };

        if let Some(url) = read(URL_VAR, LEGACY_URL_VAR) {
            self.supabase.url = Some(url);
        }
        if let Some(key) = read(ANON_KEY_VAR, LEGACY_ANON_KEY_VAR) {
            self.supabase.anon_key = Some(key);
        }

        if let Some(raw) = lookup(PROBE_TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.probe_timeout_ms = ms,
                Err(e) => warn!("Ignoring {}={:?}: {}", PROBE_TIMEOUT_VAR, raw, e),
            }
        }
        if let Some(raw) = lookup(DEMO_FALLBACK_VAR) {
            match raw.trim().parse::<bool>() {
                Ok(enabled) => self.demo_fallback = enabled,
                Err(e) => warn!("Ignoring {}={:?}: {}", DEMO_FALLBACK_VAR, raw, e),
            }
        }
        if let Some(raw) = lookup(FILTER_VAR) {
            match raw.parse::<StatusFilter>() {
                Ok(filter) => self.initial_filter = filter,
                Err(e) => warn!("Ignoring {}={:?}: {}", FILTER_VAR, raw, e),
            }
        }
    }

    /// Connection settings for the Supabase transport
    pub fn supabase_config(&self) -> Result<SupabaseConfig, ConfigError> {
        let url = self
            .supabase
            .url
            .clone()
            .ok_or(ConfigError::MissingSupabaseUrl)?;
        let anon_key = self
            .supabase
            .anon_key
            .clone()
            .ok_or(ConfigError::MissingSupabaseKey)?;

        Ok(SupabaseConfig::new(url, anon_key)
            .with_schema(self.supabase.schema.clone())
            .with_table(self.supabase.table.clone())
            .with_request_timeout(Duration::from_millis(self.supabase.request_timeout_ms)))
    }

    pub fn prober_config(&self) -> ProberConfig {
        ProberConfig {
            timeout: Duration::from_millis(self.probe_timeout_ms),
        }
    }
}
