pub mod states;

use crate::client::ChatClient;
use crate::config::ClientConfig;
use crate::dispatcher::Listener;
use crate::traits::*;
use crate::ws::WsConnector;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for [`ChatClient`]
///
/// The URL is required before `build` is available. Everything else has a
/// default: the WebSocket transport, a fixed 1500ms reconnect delay and
/// debug diagnostics off.
pub struct ClientBuilder<U>
where
    U: UrlState,
{
    _state: TypeState<U>,
    url: Option<String>,
    connector: Option<Arc<dyn Connector>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    debug: bool,
    listeners: Vec<Listener>,
}

impl ClientBuilder<NoUrl> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            url: None,
            connector: None,
            reconnect_strategy: None,
            debug: false,
            listeners: Vec::new(),
        }
    }

    pub fn url(self, url: impl Into<String>) -> ClientBuilder<HasUrl> {
        ClientBuilder {
            _state: TypeState::new(),
            url: Some(url.into()),
            connector: self.connector,
            reconnect_strategy: self.reconnect_strategy,
            debug: self.debug,
            listeners: self.listeners,
        }
    }
}

impl Default for ClientBuilder<NoUrl> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ClientBuilder<U>
where
    U: UrlState,
{
    /// Fixed wait before retrying a lost connection
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_strategy = Some(Box::new(FixedDelay::new(delay)));
        self
    }

    /// Replace the reconnection strategy
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Enable verbose lifecycle and decode diagnostics
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Use a custom transport
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Register a listener before the client task starts
    pub fn on(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl ClientBuilder<HasUrl> {
    /// Validate the configuration and spawn the client task
    ///
    /// Must be called from within a tokio runtime. The connection is not
    /// opened until [`ChatClient::open`] is called.
    pub fn build(self) -> Result<ChatClient> {
        let url = self
            .url
            .ok_or_else(|| PeerLinkError::Configuration("URL is required".into()))?;
        validate_url(&url)?;

        let connector = self.connector.unwrap_or_else(|| Arc::new(WsConnector));
        let mut config = ClientConfig::new(url, connector);
        if let Some(strategy) = self.reconnect_strategy {
            config.reconnect_strategy = strategy;
        }
        config.debug = self.debug;

        Ok(ChatClient::spawn(config, self.listeners))
    }
}

/// Accept only ws:// and wss:// addresses
pub(crate) fn validate_url(url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("ws://")
        .or_else(|| url.strip_prefix("wss://"))
        .ok_or_else(|| {
            PeerLinkError::Configuration(format!("URL must start with ws:// or wss://: {}", url))
        })?;

    if rest.is_empty() || rest.starts_with('/') {
        return Err(PeerLinkError::Configuration(format!("URL has no host: {}", url)));
    }
    Ok(())
}
