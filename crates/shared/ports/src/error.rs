use thiserror::Error;

/// Transport-level errors reported by feed and health-check adapters
///
/// Adapters convert their infrastructure errors (HTTP, websocket, JSON)
/// into this type so nothing transport-specific leaks through the ports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Subscription failed: {0}")]
    Subscribe(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Timeout waiting for response")]
    Timeout,
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;
