//! # PeerLink
//!
//! A reconnecting WebSocket client that turns a peer-relay protocol into
//! typed events.
//!
//! ## Features
//!
//! - **Typed events**: `open`, `connect`, `disconnect`, `data` and `dataString`
//!   arrive as [`ClientEvent`] variants with their own payloads
//! - **Double-unwrap decoding**: nested `data` fields are decoded whether the
//!   server encoded them once or twice
//! - **Fixed-delay reconnection**: abnormal closures and transport errors retry
//!   indefinitely; an explicit close cancels any pending retry
//! - **Single event loop**: listeners run on one task, in registration order
//! - **Pluggable transport**: tokio-tungstenite by default, any [`Connector`] in tests

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use crate::core::{
    builder, client, config, connection, connection_state, dispatcher, event, link, parser,
    protocol, ws,
    builder::{states, ClientBuilder},
    client::ChatClient,
    config::ClientConfig,
    connection::{ConnectionManager, SendOutcome},
    connection_state::ConnectionState,
    dispatcher::{EventDispatcher, Listener},
    event::{ClientEvent, DataText, EventKind, Message, ReconnectReason},
    parser::{try_parse, unwrap_payload, Parsed, Payload},
    protocol::{Envelope, Outbound},
    ws::WsConnector,
};

#[cfg(test)]
pub(crate) use crate::core::memory;
