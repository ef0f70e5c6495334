//! Event dispatch
//!
//! Listeners are registered with a [`Listener`] value, whose variant names the
//! event kind and carries a callback typed for that kind's payload. Dispatch
//! matches the event exhaustively; there is no string-keyed registry.
//!
//! Listeners for one kind run synchronously, in registration order. A panic in
//! a listener aborts the rest of that `emit` call only; the dispatcher itself
//! survives and later events are delivered normally.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::error;

use crate::event::{ClientEvent, DataText, EventKind, Message, ReconnectReason};

type IdFn = Box<dyn FnMut(&str) + Send>;
type DataFn = Box<dyn FnMut(&Message, &str) + Send>;
type DataStringFn = Box<dyn FnMut(&DataText, &str) + Send>;
type ReconnectingFn = Box<dyn FnMut(&ReconnectReason, Duration) + Send>;
type ClosedFn = Box<dyn FnMut(u16) + Send>;

/// A listener bound to one event kind
pub enum Listener {
    /// `fn(self_id)`
    Open(IdFn),
    /// `fn(peer_id)`
    Connect(IdFn),
    /// `fn(peer_id)`
    Disconnect(IdFn),
    /// `fn(message, peer_id)`
    Data(DataFn),
    /// `fn(text, peer_id)`
    DataString(DataStringFn),
    /// `fn(reason, delay)`
    Reconnecting(ReconnectingFn),
    /// `fn(close_code)`
    Closed(ClosedFn),
}

impl Listener {
    pub fn open(f: impl FnMut(&str) + Send + 'static) -> Self {
        Listener::Open(Box::new(f))
    }

    pub fn connect(f: impl FnMut(&str) + Send + 'static) -> Self {
        Listener::Connect(Box::new(f))
    }

    pub fn disconnect(f: impl FnMut(&str) + Send + 'static) -> Self {
        Listener::Disconnect(Box::new(f))
    }

    pub fn data(f: impl FnMut(&Message, &str) + Send + 'static) -> Self {
        Listener::Data(Box::new(f))
    }

    pub fn data_string(f: impl FnMut(&DataText, &str) + Send + 'static) -> Self {
        Listener::DataString(Box::new(f))
    }

    pub fn reconnecting(f: impl FnMut(&ReconnectReason, Duration) + Send + 'static) -> Self {
        Listener::Reconnecting(Box::new(f))
    }

    pub fn closed(f: impl FnMut(u16) + Send + 'static) -> Self {
        Listener::Closed(Box::new(f))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Listener::Open(_) => EventKind::Open,
            Listener::Connect(_) => EventKind::Connect,
            Listener::Disconnect(_) => EventKind::Disconnect,
            Listener::Data(_) => EventKind::Data,
            Listener::DataString(_) => EventKind::DataString,
            Listener::Reconnecting(_) => EventKind::Reconnecting,
            Listener::Closed(_) => EventKind::Closed,
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener::{:?}", self.kind())
    }
}

/// Ordered listener lists, one per event kind
#[derive(Default)]
pub struct EventDispatcher {
    open: Vec<IdFn>,
    connect: Vec<IdFn>,
    disconnect: Vec<IdFn>,
    data: Vec<DataFn>,
    data_string: Vec<DataStringFn>,
    reconnecting: Vec<ReconnectingFn>,
    closed: Vec<ClosedFn>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; returns the dispatcher for chaining
    pub fn on(&mut self, listener: Listener) -> &mut Self {
        match listener {
            Listener::Open(f) => self.open.push(f),
            Listener::Connect(f) => self.connect.push(f),
            Listener::Disconnect(f) => self.disconnect.push(f),
            Listener::Data(f) => self.data.push(f),
            Listener::DataString(f) => self.data_string.push(f),
            Listener::Reconnecting(f) => self.reconnecting.push(f),
            Listener::Closed(f) => self.closed.push(f),
        }
        self
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Open => self.open.len(),
            EventKind::Connect => self.connect.len(),
            EventKind::Disconnect => self.disconnect.len(),
            EventKind::Data => self.data.len(),
            EventKind::DataString => self.data_string.len(),
            EventKind::Reconnecting => self.reconnecting.len(),
            EventKind::Closed => self.closed.len(),
        }
    }

    /// Invoke every listener registered for the event's kind.
    ///
    /// Returns false if a listener panicked and dispatch was cut short.
    pub fn emit(&mut self, event: &ClientEvent) -> bool {
        let result = catch_unwind(AssertUnwindSafe(|| self.dispatch(event)));
        if result.is_err() {
            error!("Listener panicked while handling {:?} event", event.kind());
        }
        result.is_ok()
    }

    fn dispatch(&mut self, event: &ClientEvent) {
        match event {
            ClientEvent::Open { self_id } => {
                for f in self.open.iter_mut() {
                    f(self_id);
                }
            }
            ClientEvent::Connect { peer_id } => {
                for f in self.connect.iter_mut() {
                    f(peer_id);
                }
            }
            ClientEvent::Disconnect { peer_id } => {
                for f in self.disconnect.iter_mut() {
                    f(peer_id);
                }
            }
            ClientEvent::Data { message, peer_id } => {
                for f in self.data.iter_mut() {
                    f(message, peer_id);
                }
            }
            ClientEvent::DataString { text, peer_id } => {
                for f in self.data_string.iter_mut() {
                    f(text, peer_id);
                }
            }
            ClientEvent::Reconnecting { reason, delay } => {
                for f in self.reconnecting.iter_mut() {
                    f(reason, *delay);
                }
            }
            ClientEvent::Closed { code } => {
                for f in self.closed.iter_mut() {
                    f(*code);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Clone + Send + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |entry: String| sink.lock().push(entry))
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let (log, record) = recorder();
        let mut dispatcher = EventDispatcher::new();

        let (first, second) = (record.clone(), record.clone());
        dispatcher
            .on(Listener::connect(move |id| first(format!("first:{}", id))))
            .on(Listener::connect(move |id| second(format!("second:{}", id))));

        assert!(dispatcher.emit(&ClientEvent::Connect { peer_id: "p2".into() }));
        assert_eq!(*log.lock(), vec!["first:p2", "second:p2"]);
    }

    #[test]
    fn test_only_matching_kind_is_invoked() {
        let (log, record) = recorder();
        let mut dispatcher = EventDispatcher::new();

        let (on_open, on_data) = (record.clone(), record.clone());
        dispatcher
            .on(Listener::open(move |id| on_open(format!("open:{}", id))))
            .on(Listener::data(move |msg, id| {
                on_data(format!("data:{}:{}", msg.get_str("content").unwrap_or(""), id))
            }));

        dispatcher.emit(&ClientEvent::Data {
            message: Message::new(json!({"content": "hi"})),
            peer_id: "p1".into(),
        });
        dispatcher.emit(&ClientEvent::Disconnect { peer_id: "p3".into() });

        assert_eq!(*log.lock(), vec!["data:hi:p1"]);
        assert_eq!(dispatcher.listener_count(EventKind::Open), 1);
        assert_eq!(dispatcher.listener_count(EventKind::Disconnect), 0);
    }

    #[test]
    fn test_panicking_listener_aborts_rest_of_emit_only() {
        let (log, record) = recorder();
        let mut dispatcher = EventDispatcher::new();

        let after = record.clone();
        dispatcher
            .on(Listener::data_string(|text, _| {
                if text.as_str() == Some("boom") {
                    panic!("listener failure");
                }
            }))
            .on(Listener::data_string(move |text, id| {
                after(format!("{}:{}", text, id))
            }));

        let boom = ClientEvent::DataString {
            text: DataText::Text("boom".into()),
            peer_id: "p1".into(),
        };
        let fine = ClientEvent::DataString {
            text: DataText::Text("fine".into()),
            peer_id: "p1".into(),
        };

        assert!(!dispatcher.emit(&boom));
        assert!(dispatcher.emit(&fine));
        assert_eq!(*log.lock(), vec!["fine:p1"]);
    }

    #[test]
    fn test_listener_kind() {
        assert_eq!(Listener::closed(|_| {}).kind(), EventKind::Closed);
        assert_eq!(Listener::reconnecting(|_, _| {}).kind(), EventKind::Reconnecting);
    }
}
