use aurum_ports::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Channel join rejected: {0}")]
    JoinRejected(String),
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("Channel closed")]
    ChannelClosed,
}

/// Convert infrastructure SupabaseError to port TransportError
impl From<SupabaseError> for TransportError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Http(e) if e.is_timeout() => TransportError::Timeout,
            SupabaseError::Http(e) if e.is_connect() => TransportError::Connection(e.to_string()),
            SupabaseError::Http(e) => TransportError::Request(e.to_string()),
            SupabaseError::Api { status, message } if status == 401 || status == 403 => {
                TransportError::Unauthorized(message)
            }
            SupabaseError::Api { status, message } => {
                TransportError::Request(format!("HTTP {}: {}", status, message))
            }
            SupabaseError::Parse(msg) => TransportError::Deserialization(msg),
            SupabaseError::Serialization(e) => TransportError::Deserialization(e.to_string()),
            SupabaseError::WebSocket(e) => TransportError::Connection(e.to_string()),
            SupabaseError::InvalidUrl(e) => TransportError::Connection(e.to_string()),
            SupabaseError::MissingEnv(var) => {
                TransportError::Connection(format!("{} is not set", var))
            }
            SupabaseError::JoinRejected(reason) => TransportError::Subscribe(reason),
            SupabaseError::Timeout(_) => TransportError::Timeout,
            SupabaseError::ChannelClosed => TransportError::ChannelClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_map_to_unauthorized() {
        let err = SupabaseError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(
            TransportError::from(err),
            TransportError::Unauthorized("Invalid API key".to_string())
        );
    }

    #[test]
    fn test_join_rejection_maps_to_subscribe() {
        let err = SupabaseError::JoinRejected("unknown table".to_string());
        assert!(matches!(
            TransportError::from(err),
            TransportError::Subscribe(_)
        ));
    }
}
