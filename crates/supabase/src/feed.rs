use async_trait::async_trait;
use aurum_core::Signal;
use aurum_ports::{ChangeStream, HealthCheck, SignalFeed, TransportError, TransportResult};

use crate::config::SupabaseConfig;
use crate::error::SupabaseError;
use crate::realtime::RealtimeClient;
use crate::rest::SupabaseRest;

/// Signal feed backed by a Supabase table
///
/// Snapshot reads go through PostgREST, live changes through Realtime.
#[derive(Clone)]
pub struct SupabaseFeed {
    rest: SupabaseRest,
    realtime: RealtimeClient,
}

impl SupabaseFeed {
    /// Fails on a project URL that cannot be parsed, before any request
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseError> {
        config.realtime_url()?;
        Ok(SupabaseFeed {
            rest: SupabaseRest::new(config.clone())?,
            realtime: RealtimeClient::new(config),
        })
    }

    /// Build from `AURUM_SUPABASE_*` (or `EXPO_PUBLIC_SUPABASE_*`) variables
    pub fn from_env() -> Result<Self, SupabaseError> {
        Self::new(SupabaseConfig::from_env()?)
    }
}

#[async_trait]
impl SignalFeed for SupabaseFeed {
    async fn fetch_all(&self) -> TransportResult<Vec<Signal>> {
        self.rest.fetch_signals().await.map_err(TransportError::from)
    }

    async fn open_channel(&self) -> TransportResult<Box<dyn ChangeStream>> {
        let stream = self.realtime.connect().await.map_err(TransportError::from)?;
        Ok(Box::new(stream))
    }

    fn name(&self) -> &str {
        "SupabaseFeed"
    }
}

#[async_trait]
impl HealthCheck for SupabaseFeed {
    async fn ping(&self) -> TransportResult<()> {
        self.rest.ping().await.map_err(TransportError::from)
    }

    fn name(&self) -> &str {
        "SupabaseFeed"
    }
}
