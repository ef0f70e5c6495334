//! # Client internals
//!
//! ```text
//! transport ─> Frame ─> parser ─> Envelope ─> ClientEvent ─> EventDispatcher ─> listeners
//!                 ^
//!             LinkHandle <── ConnectionManager <── ChatClient::send
//! ```
//!
//! - [`connection::ConnectionManager`]: lifecycle state machine, reconnect timer, send path
//! - [`link`]: one tokio task per transport handle, generation-tagged signals
//! - [`parser`] / [`protocol`]: best-effort JSON decoding and envelope translation
//! - [`dispatcher::EventDispatcher`]: typed listener lists
//! - [`client::ChatClient`]: the façade, a handle to the single client task
//!
//! ## Example
//!
//! ```rust,ignore
//! use peerlink::{ChatClient, Listener, Outbound};
//!
//! #[tokio::main]
//! async fn main() -> peerlink::Result<()> {
//!     let client = ChatClient::builder()
//!         .url("wss://chat.example.com/room")
//!         .reconnect_delay(Duration::from_millis(1500))
//!         .build()?;
//!
//!     client.on(Listener::connect(|peer| println!("{} has joined", peer)));
//!     client.open();
//!     client.send(Outbound::json(&serde_json::json!({"content": "hi"}))?);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection;
pub mod connection_state;
pub mod dispatcher;
pub mod event;
pub mod link;
pub mod parser;
pub mod protocol;
pub mod ws;

#[cfg(test)]
pub(crate) mod memory;

// Re-export main types
pub use builder::{states, ClientBuilder};
pub use client::ChatClient;
pub use config::ClientConfig;
pub use connection::{ConnectionManager, SendOutcome};
pub use connection_state::ConnectionState;
pub use dispatcher::{EventDispatcher, Listener};
pub use event::{ClientEvent, DataText, EventKind, Message, ReconnectReason};
pub use link::{LinkEvent, Signal};
pub use parser::{try_parse, unwrap_payload, Parsed, Payload};
pub use protocol::{Envelope, Outbound};
pub use ws::WsConnector;

// Re-export traits for convenience
pub use crate::traits::*;
