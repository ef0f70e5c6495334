use thiserror::Error;

/// Main error type for peerlink
#[derive(Error, Debug)]
pub enum PeerLinkError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Outbound payload could not be serialized into an envelope
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for PeerLinkError {
    fn from(err: serde_json::Error) -> Self {
        PeerLinkError::Serialization(err.to_string())
    }
}

/// Result type for peerlink operations
pub type Result<T> = std::result::Result<T, PeerLinkError>;
