use aurum_core::StatusFilter;
use serde::{Deserialize, Serialize};

/// Top-level client configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub supabase: SupabaseSettings,
    /// Upper bound on one connectivity check
    pub probe_timeout_ms: u64,
    /// Show the bundled demo signals when the feed cannot be reached
    pub demo_fallback: bool,
    pub initial_filter: StatusFilter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            supabase: SupabaseSettings::default(),
            probe_timeout_ms: 5_000,
            demo_fallback: true,
            initial_filter: StatusFilter::All,
        }
    }
}

/// Supabase project settings; URL and key usually come from the environment
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub schema: String,
    pub table: String,
    pub request_timeout_ms: u64,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            schema: "public".to_string(),
            table: "signals".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field("schema", &self.schema)
            .field("table", &self.table)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}
