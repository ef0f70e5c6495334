//! Common test utilities for PeerLink integration tests
//!
//! Provides a scripted chat relay server and helpers for collecting events.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use peerlink::{ChatClient, ClientEvent, Listener};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::{broadcast, Notify};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Route client logs to stdout when TEST_VERBOSE is set
///
/// `RUST_LOG` picks the filter; defaults to `peerlink=debug`.
pub fn init_test_logging() {
    if std::env::var("TEST_VERBOSE").is_err() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("peerlink=debug"));
    // Several tests share the process; only the first install wins
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Something the server does to every live connection
#[derive(Debug, Clone)]
pub enum ServerAction {
    /// Send a text frame
    Text(String),
    /// Send a close frame with this code
    Close(u16),
    /// Drop the socket without a closing handshake
    Drop,
}

/// A mock relay server
///
/// Each accepted connection is greeted with `{"type":"onopen","id":"peer-N"}`
/// where N counts connections from 1. Text frames from clients are recorded.
pub struct MockChatServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
    actions: broadcast::Sender<ServerAction>,
}

impl MockChatServer {
    /// Create and start a new mock server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let connections = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));
        let (actions, _) = broadcast::channel(64);

        {
            let shutdown = Arc::clone(&shutdown);
            let connections = Arc::clone(&connections);
            let received = Arc::clone(&received);
            let actions = actions.clone();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            match result {
                                Ok((stream, _)) => {
                                    let n = connections.fetch_add(1, Ordering::SeqCst) + 1;
                                    let shutdown = Arc::clone(&shutdown);
                                    let received = Arc::clone(&received);
                                    let actions = actions.subscribe();
                                    tokio::spawn(async move {
                                        Self::handle_connection(stream, n, shutdown, received, actions).await;
                                    });
                                }
                                Err(e) => {
                                    eprintln!("Accept error: {}", e);
                                    break;
                                }
                            }
                        }
                        _ = shutdown.notified() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            addr,
            shutdown,
            connections,
            received,
            actions,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        n: usize,
        shutdown: Arc<Notify>,
        received: Arc<Mutex<Vec<String>>>,
        mut actions: broadcast::Receiver<ServerAction>,
    ) {
        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        let greeting = format!(r#"{{"type":"onopen","id":"peer-{}"}}"#, n);
        if write.send(Message::Text(greeting)).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => received.lock().push(text),
                        // Keep reading so the close reply gets flushed
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => break,
                    }
                }
                action = actions.recv() => {
                    match action {
                        Ok(ServerAction::Text(text)) => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Ok(ServerAction::Close(code)) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: "".into(),
                            };
                            if write.send(Message::Close(Some(frame))).await.is_err() {
                                break;
                            }
                        }
                        Ok(ServerAction::Drop) | Err(_) => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Text frames received from clients, in order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    pub fn push_text(&self, text: &str) {
        let _ = self.actions.send(ServerAction::Text(text.to_string()));
    }

    pub fn close_all(&self, code: u16) {
        let _ = self.actions.send(ServerAction::Close(code));
    }

    pub fn drop_all(&self) {
        let _ = self.actions.send(ServerAction::Drop);
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Forward every event kind the client emits into one channel
pub fn collect_events(client: &ChatClient) -> UnboundedReceiver<ClientEvent> {
    init_test_logging();
    let (tx, rx) = unbounded_channel();

    let open = tx.clone();
    let connect = tx.clone();
    let disconnect = tx.clone();
    let data = tx.clone();
    let text = tx.clone();
    let retry = tx.clone();
    let closed = tx;

    client
        .on(Listener::open(move |id| {
            let _ = open.send(ClientEvent::Open { self_id: id.into() });
        }))
        .on(Listener::connect(move |id| {
            let _ = connect.send(ClientEvent::Connect { peer_id: id.into() });
        }))
        .on(Listener::disconnect(move |id| {
            let _ = disconnect.send(ClientEvent::Disconnect { peer_id: id.into() });
        }))
        .on(Listener::data(move |message, id| {
            let _ = data.send(ClientEvent::Data {
                message: message.clone(),
                peer_id: id.into(),
            });
        }))
        .on(Listener::data_string(move |payload, id| {
            let _ = text.send(ClientEvent::DataString {
                text: payload.clone(),
                peer_id: id.into(),
            });
        }))
        .on(Listener::reconnecting(move |reason, delay| {
            let _ = retry.send(ClientEvent::Reconnecting {
                reason: reason.clone(),
                delay,
            });
        }))
        .on(Listener::closed(move |code| {
            let _ = closed.send(ClientEvent::Closed { code });
        }));

    rx
}

/// Wait for the next event, failing the test after 5 seconds
pub async fn next_event(events: &mut UnboundedReceiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Poll `check` until it holds, failing after 5 seconds
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 5s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
