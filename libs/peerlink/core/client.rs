use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::builder::{states::NoUrl, ClientBuilder};
use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::dispatcher::{EventDispatcher, Listener};
use crate::link::Signal;
use crate::protocol::Outbound;
use crate::traits::Result;

/// Internal command messages for client control
#[derive(Debug)]
enum ClientCommand {
    /// Start (or restart) the connection
    Open,
    /// Send an application payload
    Send(Outbound),
    /// Close the connection
    Close,
    /// Register a listener
    Subscribe(Listener),
}

/// Reconnecting chat client
///
/// The client is a cheap handle to a single background task that owns the
/// connection manager and the event dispatcher. Every operation is a
/// fire-and-forget command to that task, so nothing here blocks and every
/// listener runs on the same task, one event at a time.
///
/// Dropping the client closes the connection and stops the task.
///
/// # Example
/// ```ignore
/// let client = ChatClient::new("wss://chat.example.com/room")?;
/// client
///     .on(Listener::open(|self_id| println!("joined as {}", self_id)))
///     .on(Listener::data(|msg, from| println!("{}: {:?}", from, msg.get_str("content"))));
/// client.open();
/// client.send(Outbound::json(&json!({"content": "hello"}))?);
/// ```
pub struct ChatClient {
    url: String,
    command_tx: UnboundedSender<ClientCommand>,
}

impl ChatClient {
    /// Start a builder
    pub fn builder() -> ClientBuilder<NoUrl> {
        ClientBuilder::new()
    }

    /// Client for `url` with the default 1500ms reconnect delay
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::builder().url(url).build()
    }

    /// Spawn the client task. Called by the builder's `build()`.
    pub(crate) fn spawn(config: ClientConfig, listeners: Vec<Listener>) -> Self {
        let url = config.url.clone();
        let (command_tx, command_rx) = unbounded_channel();
        let (signal_tx, signal_rx) = unbounded_channel();

        let connection = ConnectionManager::new(config, signal_tx);
        let mut dispatcher = EventDispatcher::new();
        for listener in listeners {
            dispatcher.on(listener);
        }

        tokio::spawn(run_client(connection, dispatcher, command_rx, signal_rx));

        Self { url, command_tx }
    }

    /// Connect, replacing any existing connection
    pub fn open(&self) {
        self.command(ClientCommand::Open);
    }

    /// Send a payload if connected; silently dropped otherwise
    pub fn send(&self, payload: impl Into<Outbound>) {
        self.command(ClientCommand::Send(payload.into()));
    }

    /// Close the connection; no reconnect follows
    pub fn close(&self) {
        self.command(ClientCommand::Close);
    }

    /// Register a listener
    pub fn on(&self, listener: Listener) -> &Self {
        self.command(ClientCommand::Subscribe(listener));
        self
    }

    fn command(&self, cmd: ClientCommand) {
        if let Err(e) = self.command_tx.send(cmd) {
            debug!("Client task for {} is gone, dropping {:?}", self.url, e.0);
        }
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient").field("url", &self.url).finish()
    }
}

/// Main client task loop
async fn run_client(
    mut connection: ConnectionManager,
    mut dispatcher: EventDispatcher,
    mut command_rx: UnboundedReceiver<ClientCommand>,
    mut signal_rx: UnboundedReceiver<Signal>,
) {
    loop {
        tokio::select! {
            biased;

            cmd = command_rx.recv() => {
                match cmd {
                    Some(ClientCommand::Open) => connection.open(),
                    Some(ClientCommand::Send(payload)) => {
                        let outcome = connection.send(payload);
                        debug!("Send outcome: {:?}", outcome);
                    }
                    Some(ClientCommand::Close) => connection.close(),
                    Some(ClientCommand::Subscribe(listener)) => {
                        dispatcher.on(listener);
                    }
                    None => {
                        debug!("Client handle dropped, closing connection");
                        connection.close();
                        break;
                    }
                }
            }

            Some(signal) = signal_rx.recv() => {
                if let Some(event) = connection.handle_signal(signal) {
                    dispatcher.emit(&event);
                }
            }
        }
    }

    info!("Client task exiting");
}
