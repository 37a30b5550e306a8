use async_trait::async_trait;

use crate::error::TransportResult;

/// Port for a lightweight reachability call
///
/// Implementations perform a single cheap request (e.g. a one-row metadata
/// read) that succeeds iff the backend is reachable and the credentials are
/// accepted. No retries; the caller bounds the wait.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> TransportResult<()>;

    /// Adapter name for logging
    fn name(&self) -> &str {
        "HealthCheck"
    }
}
