//! Supabase connection settings

use crate::error::SupabaseError;
use std::time::Duration;
use url::Url;

pub const URL_VAR: &str = "AURUM_SUPABASE_URL";
pub const ANON_KEY_VAR: &str = "AURUM_SUPABASE_ANON_KEY";
/// Names used by the mobile app's build environment
pub const LEGACY_URL_VAR: &str = "EXPO_PUBLIC_SUPABASE_URL";
pub const LEGACY_ANON_KEY_VAR: &str = "EXPO_PUBLIC_SUPABASE_ANON_KEY";

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_TABLE: &str = "signals";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Realtime protocol version spoken by [`RealtimeClient`](crate::RealtimeClient)
const REALTIME_VSN: &str = "1.0.0";

#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. "https://abcd.supabase.co"
    pub url: String,
    pub anon_key: String,
    pub schema: String,
    pub table: String,
    /// Bound on each REST request and on the realtime join handshake
    pub request_timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read URL and key from the process environment
    pub fn from_env() -> Result<Self, SupabaseError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read URL and key through `lookup`, preferring the `AURUM_*` names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SupabaseError> {
        let read = |primary: &'static str, legacy: &'static str| {
            lookup(primary)
                .or_else(|| lookup(legacy))
                .filter(|value| !value.trim().is_empty())
                .ok_or(SupabaseError::MissingEnv(primary))
        };

        let url = read(URL_VAR, LEGACY_URL_VAR)?;
        let anon_key = read(ANON_KEY_VAR, LEGACY_ANON_KEY_VAR)?;
        Ok(Self::new(url, anon_key))
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// PostgREST endpoint of the configured table
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }

    /// Realtime websocket endpoint, with the key and protocol version
    pub fn realtime_url(&self) -> Result<Url, SupabaseError> {
        let mut url = Url::parse(&self.url)?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme).map_err(|_| {
            SupabaseError::Parse(format!("cannot use {} as a websocket URL", self.url))
        })?;
        url.set_path("/realtime/v1/websocket");
        url.query_pairs_mut()
            .clear()
            .append_pair("apikey", &self.anon_key)
            .append_pair("vsn", REALTIME_VSN);
        Ok(url)
    }

    /// Channel topic carrying changes of the configured table
    pub fn topic(&self) -> String {
        format!("realtime:{}:{}", self.schema, self.table)
    }
}

// Keep the key out of logs
impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .field("schema", &self.schema)
            .field("table", &self.table)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
