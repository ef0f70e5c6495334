//! Wire protocol
//!
//! Inbound envelopes look like `{"type": ..., "id": ..., "data"?: ...}` where
//! `type` is one of `onopen`, `connect`, `disconnect` or `data`. Outbound
//! application payloads are sent as `{"type": "data", ...fields}`.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PeerLinkError, Result};
use crate::event::{ClientEvent, DataText, Message};
use crate::frame::Frame;
use crate::parser::{unwrap_payload, Payload};

/// Decoded inbound envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    OnOpen { id: String },
    Connect { id: String },
    Disconnect { id: String },
    Data { id: String, data: Option<Value> },
    /// Tagged with a type this client does not know
    Unknown { kind: Value },
    /// No usable `type` tag at all
    Untagged(Value),
}

impl Envelope {
    /// Classify a decoded frame
    pub fn from_value(mut value: Value) -> Self {
        let kind = match value.get("type") {
            Some(kind) if is_truthy(kind) => kind.clone(),
            _ => return Envelope::Untagged(value),
        };
        let id = peer_id(value.get("id"));

        match kind.as_str() {
            Some("onopen") => Envelope::OnOpen { id },
            Some("connect") => Envelope::Connect { id },
            Some("disconnect") => Envelope::Disconnect { id },
            Some("data") => {
                let data = value.as_object_mut().and_then(|obj| obj.remove("data"));
                Envelope::Data { id, data }
            }
            _ => Envelope::Unknown { kind },
        }
    }

    /// Translate into the event it dispatches, if any
    pub fn into_event(self, debug: bool) -> Option<ClientEvent> {
        match self {
            Envelope::OnOpen { id } => Some(ClientEvent::Open { self_id: id }),
            Envelope::Connect { id } => Some(ClientEvent::Connect { peer_id: id }),
            Envelope::Disconnect { id } => Some(ClientEvent::Disconnect { peer_id: id }),
            Envelope::Data { id, data } => Some(match unwrap_payload(data, debug) {
                Payload::Structured(value) => ClientEvent::Data {
                    message: Message::new(value),
                    peer_id: id,
                },
                Payload::Text(text) => ClientEvent::DataString {
                    text: DataText::Text(text),
                    peer_id: id,
                },
            }),
            Envelope::Unknown { kind } => {
                if debug {
                    debug!("Ignoring envelope with unknown type {}", kind);
                }
                None
            }
            Envelope::Untagged(value) => {
                let peer_id = peer_id(value.get("id"));
                Some(ClientEvent::DataString {
                    text: DataText::Untagged(value),
                    peer_id,
                })
            }
        }
    }
}

/// JS-style truthiness of a tag value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Peer ids are opaque strings; numeric ids are stringified, anything else is empty
fn peer_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Outbound application payload
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Sent unmodified
    Raw(String),
    /// Wrapped as `{"type": "data", ...fields}`
    Fields(Map<String, Value>),
}

impl Outbound {
    /// Serialize an application type into envelope fields
    ///
    /// The value must serialize to a JSON object.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self> {
        match serde_json::to_value(payload)? {
            Value::Object(fields) => Ok(Outbound::Fields(fields)),
            other => Err(PeerLinkError::Serialization(format!(
                "outbound payload must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Produce the frame written to the transport.
    ///
    /// Application fields are applied after the tag, so a payload carrying its
    /// own `type` overrides it.
    pub fn into_frame(self) -> Frame {
        match self {
            Outbound::Raw(text) => Frame::Text(text),
            Outbound::Fields(fields) => {
                let mut envelope = Map::with_capacity(fields.len() + 1);
                envelope.insert("type".to_string(), Value::String("data".to_string()));
                envelope.extend(fields);
                Frame::Text(Value::Object(envelope).to_string())
            }
        }
    }
}

impl From<String> for Outbound {
    fn from(text: String) -> Self {
        Outbound::Raw(text)
    }
}

impl From<&str> for Outbound {
    fn from(text: &str) -> Self {
        Outbound::Raw(text.to_string())
    }
}

impl From<Map<String, Value>> for Outbound {
    fn from(fields: Map<String, Value>) -> Self {
        Outbound::Fields(fields)
    }
}

impl TryFrom<Value> for Outbound {
    type Error = PeerLinkError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Outbound::Raw(text)),
            Value::Object(fields) => Ok(Outbound::Fields(fields)),
            other => Err(PeerLinkError::Serialization(format!(
                "cannot send {} as a frame",
                other
            ))),
        }
    }
}
