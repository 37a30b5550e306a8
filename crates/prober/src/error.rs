use aurum_ports::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Why a probe failed. Only ever logged; the caller sees `Unreachable`.
#[derive(Error, Debug)]
pub(crate) enum ProbeError {
    #[error("Health check failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Health check timed out after {0:?}")]
    TimedOut(Duration),
}
