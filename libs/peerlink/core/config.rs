use crate::traits::*;
use std::sync::Arc;

/// Configuration for a client connection
///
/// This struct holds everything the connection manager needs. It is
/// produced by the type-state builder.
pub struct ClientConfig {
    /// WebSocket URL (wss:// or ws://)
    pub(crate) url: String,

    /// Transport used for every connection attempt
    pub(crate) connector: Arc<dyn Connector>,

    /// Reconnection strategy (fixed 1500ms delay by default)
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// Emit verbose lifecycle and decode diagnostics
    pub(crate) debug: bool,
}

impl ClientConfig {
    pub(crate) fn new(url: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        Self {
            url: url.into(),
            connector,
            reconnect_strategy: Box::new(FixedDelay::default()),
            debug: false,
        }
    }

    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if debug diagnostics are enabled
    pub fn debug(&self) -> bool {
        self.debug
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::WsConnector;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("wss://chat.example.com/room", Arc::new(WsConnector));
        assert_eq!(config.url(), "wss://chat.example.com/room");
        assert!(!config.debug());
        assert_eq!(
            config.reconnect_strategy.next_delay(0),
            Some(DEFAULT_RECONNECT_DELAY)
        );

        let debug = format!("{:?}", config);
        assert!(debug.contains("chat.example.com"));
    }
}
