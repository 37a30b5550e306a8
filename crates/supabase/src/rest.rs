use async_trait::async_trait;
use aurum_core::Signal;
use aurum_ports::{HealthCheck, TransportError, TransportResult};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::config::SupabaseConfig;
use crate::error::SupabaseError;

/// PostgREST client for the signals table
/// Infrastructure component - handles HTTP communication
#[derive(Clone)]
pub struct SupabaseRest {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseRest {
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(SupabaseRest { client, config })
    }

    /// Full read of the table, newest first
    pub async fn fetch_signals(&self) -> Result<Vec<Signal>, SupabaseError> {
        let signals: Vec<Signal> = self
            .get(&[("select", "*"), ("order", "timestamp.desc")])
            .await?;
        debug!("Fetched {} signals from {}", signals.len(), self.config.table);
        Ok(signals)
    }

    /// Cheapest read that still needs a reachable backend and a valid key
    pub async fn ping(&self) -> Result<(), SupabaseError> {
        let _: Vec<serde_json::Value> = self.get(&[("select", "id"), ("limit", "1")]).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, query: &[(&str, &str)]) -> Result<T, SupabaseError> {
        let resp = self
            .client
            .get(self.config.rest_url())
            .query(query)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
            .header("Accept-Profile", &self.config.schema)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|err| err.message)
                .unwrap_or(text);
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| SupabaseError::Parse(e.to_string()))
    }
}

/// PostgREST and gateway error body
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Implement HealthCheck for SupabaseRest (Dependency Inversion)
#[async_trait]
impl HealthCheck for SupabaseRest {
    async fn ping(&self) -> TransportResult<()> {
        SupabaseRest::ping(self).await.map_err(TransportError::from)
    }

    fn name(&self) -> &str {
        "SupabaseRest"
    }
}
