//! Typed client events
//!
//! Every event kind carries its own payload, so listeners never inspect a
//! string name or an untyped argument list.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Decoded application payload of a `data` envelope
///
/// The client makes no assumption about the fields present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Look up a top-level string field
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Deserialize the payload into an application type
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.0)?)
    }
}

/// Payload of a `DataString` event
#[derive(Debug, Clone, PartialEq)]
pub enum DataText {
    /// Nested `data` field that did not decode to a structure
    Text(String),
    /// A whole envelope that carried no `type` tag, passed through as decoded.
    /// Legacy servers send these; the value is usually not a string.
    Untagged(Value),
}

impl DataText {
    /// The text, if this is not an untagged envelope
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataText::Text(text) => Some(text),
            DataText::Untagged(_) => None,
        }
    }

    pub fn is_untagged(&self) -> bool {
        matches!(self, DataText::Untagged(_))
    }
}

impl fmt::Display for DataText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataText::Text(text) => f.write_str(text),
            DataText::Untagged(value) => write!(f, "{}", value),
        }
    }
}

/// Why the connection manager scheduled a reconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconnectReason {
    /// Transport closed with a code other than normal closure
    AbnormalClose(u16),
    /// Transport failed, including failed connection attempts
    TransportError(String),
}

impl fmt::Display for ReconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconnectReason::AbnormalClose(code) => write!(f, "abnormal closure (code {})", code),
            ReconnectReason::TransportError(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// Event kinds, used for listener bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Open,
    Connect,
    Disconnect,
    Data,
    DataString,
    Reconnecting,
    Closed,
}

/// Event dispatched to listeners
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Server assigned this client its identity
    Open { self_id: String },
    /// Another peer joined
    Connect { peer_id: String },
    /// Another peer left
    Disconnect { peer_id: String },
    /// Structured data from a peer
    Data { message: Message, peer_id: String },
    /// Unstructured data from a peer
    DataString { text: DataText, peer_id: String },
    /// Connection lost, retrying after `delay`
    Reconnecting { reason: ReconnectReason, delay: Duration },
    /// Transport gone for good (until the next `open`)
    Closed { code: u16 },
}

impl ClientEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::Open { .. } => EventKind::Open,
            ClientEvent::Connect { .. } => EventKind::Connect,
            ClientEvent::Disconnect { .. } => EventKind::Disconnect,
            ClientEvent::Data { .. } => EventKind::Data,
            ClientEvent::DataString { .. } => EventKind::DataString,
            ClientEvent::Reconnecting { .. } => EventKind::Reconnecting,
            ClientEvent::Closed { .. } => EventKind::Closed,
        }
    }
}
