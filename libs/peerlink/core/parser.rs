//! Best-effort JSON decoding
//!
//! Decoding never fails: anything that is not valid JSON comes back as the
//! original text. The same decoder is applied twice on the data path, once to
//! the frame and once to an envelope's nested `data` field, because the server
//! may or may not encode that field a second time.

use serde_json::Value;
use tracing::debug;

/// Outcome of a single decode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Input was valid JSON
    Json(Value),
    /// Input was not JSON and is returned unchanged
    Raw(String),
}

impl Parsed {
    /// Returns true if decoding fell back to the raw text
    pub fn is_raw(&self) -> bool {
        matches!(self, Parsed::Raw(_))
    }
}

/// Outcome of unwrapping an envelope's nested `data` field
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured application payload
    Structured(Value),
    /// Plain text that did not decode to anything but a string
    Text(String),
}

/// Attempt to decode `raw` as JSON, falling back to the raw string.
///
/// When `debug` is set, decode failures are logged.
pub fn try_parse(raw: &str, debug: bool) -> Parsed {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Parsed::Json(value),
        Err(e) => {
            if debug {
                debug!("Failed to parse data blob as JSON ({}): {}", e, raw);
            }
            Parsed::Raw(raw.to_string())
        }
    }
}

/// Second decode pass over an envelope's `data` field.
///
/// A string field is decoded again. If that yields anything other than a
/// string it is structured; raw text and JSON string literals stay text.
/// Already structured values pass through, and a missing field is `Null`.
pub fn unwrap_payload(field: Option<Value>, debug: bool) -> Payload {
    match field {
        Some(Value::String(inner)) => match try_parse(&inner, debug) {
            Parsed::Json(Value::String(text)) => Payload::Text(text),
            Parsed::Json(value) => Payload::Structured(value),
            Parsed::Raw(text) => Payload::Text(text),
        },
        Some(value) => Payload::Structured(value),
        None => Payload::Structured(Value::Null),
    }
}
