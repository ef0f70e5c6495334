//! Connection manager
//!
//! Owns the transport handle, the lifecycle state and the reconnect timer.
//! It is driven entirely by its owner (the client task): commands come in as
//! method calls, transport activity comes in as [`Signal`]s, and any resulting
//! application event is handed back for dispatch.
//!
//! Every `open` bumps a generation counter. Signals carry the generation of
//! the handle (or timer) that produced them, and anything from an older
//! generation is ignored, so a replaced handle can never dispatch.

use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::connection_state::ConnectionState;
use crate::event::{ClientEvent, ReconnectReason};
use crate::frame::Frame;
use crate::link::{LinkEvent, LinkHandle, Signal};
use crate::parser::{try_parse, Parsed};
use crate::protocol::{Envelope, Outbound};
use crate::traits::{CLOSE_ABNORMAL, CLOSE_NORMAL};

/// Result of a `send` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the transport
    Written,
    /// Not open; nothing was written
    Dropped,
}

pub struct ConnectionManager {
    config: ClientConfig,
    state: ConnectionState,
    handle: Option<LinkHandle>,
    generation: u64,
    attempt: usize,
    closing: bool,
    reconnect_timer: Option<JoinHandle<()>>,
    signal_tx: UnboundedSender<Signal>,
}

impl ConnectionManager {
    pub fn new(config: ClientConfig, signal_tx: UnboundedSender<Signal>) -> Self {
        Self {
            config,
            state: ConnectionState::Closed,
            handle: None,
            generation: 0,
            attempt: 0,
            closing: false,
            reconnect_timer: None,
            signal_tx,
        }
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Generation of the current (or most recent) handle
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if a transport handle is attached
    #[inline]
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Start a new transport handle, discarding any previous one
    pub fn open(&mut self) {
        self.cancel_reconnect();
        self.reset();
        self.closing = false;
        self.generation += 1;

        if self.config.debug {
            debug!("Opening link {} to {}", self.generation, self.config.url);
        }

        self.handle = Some(LinkHandle::spawn(
            self.config.connector.clone(),
            self.config.url.clone(),
            self.generation,
            self.signal_tx.clone(),
        ));
        self.state = ConnectionState::Connecting;
    }

    /// Detach the current handle without waiting for it to close
    pub fn reset(&mut self) {
        if let Some(handle) = self.handle.take() {
            if self.config.debug {
                debug!("Detaching link {}", handle.generation());
            }
        }
    }

    /// Detach and schedule a single retry of `open`
    ///
    /// Returns the event to dispatch: `Reconnecting`, or `Closed` when the
    /// strategy gives up.
    pub fn reconnect(&mut self, reason: ReconnectReason) -> ClientEvent {
        self.reset();
        self.cancel_reconnect();

        match self.config.reconnect_strategy.next_delay(self.attempt) {
            Some(delay) => {
                info!("Retrying {} in {:?} after {}", self.config.url, delay, reason);
                self.attempt += 1;
                self.state = ConnectionState::Reconnecting;
                self.schedule_reconnect(delay);
                ClientEvent::Reconnecting { reason, delay }
            }
            None => {
                warn!("Reconnection strategy exhausted after {}, staying closed", reason);
                self.state = ConnectionState::Closed;
                let code = match reason {
                    ReconnectReason::AbnormalClose(code) => code,
                    ReconnectReason::TransportError(_) => CLOSE_ABNORMAL,
                };
                ClientEvent::Closed { code }
            }
        }
    }

    /// Write an application payload if the connection is open
    pub fn send(&mut self, payload: Outbound) -> SendOutcome {
        if !self.state.is_open() {
            if self.config.debug {
                debug!("Dropping outbound payload while {}", self.state);
            }
            return SendOutcome::Dropped;
        }

        match &self.handle {
            Some(handle) if handle.send(payload.into_frame()) => SendOutcome::Written,
            _ => SendOutcome::Dropped,
        }
    }

    /// Close the connection; no reconnect follows
    pub fn close(&mut self) {
        self.closing = true;
        self.cancel_reconnect();

        match self.handle.take() {
            Some(handle) if !handle.is_closed() => {
                debug!("Requesting normal closure of link {}", handle.generation());
                handle.close(CLOSE_NORMAL);
                // Kept until the closure is observed
                self.handle = Some(handle);
            }
            _ => {}
        }

        if !self.state.is_closed() {
            info!("Connection to {} closed", self.config.url);
        }
        self.state = ConnectionState::Closed;
    }

    /// Process one signal; returns the event to dispatch, if any
    pub fn handle_signal(&mut self, signal: Signal) -> Option<ClientEvent> {
        match signal {
            Signal::ReconnectDue { generation } => {
                if self.closing
                    || generation != self.generation
                    || self.state != ConnectionState::Reconnecting
                {
                    debug!("Ignoring stale reconnect timer for link {}", generation);
                    return None;
                }
                self.reconnect_timer = None;
                if self.config.debug {
                    debug!("Reconnecting to {}...", self.config.url);
                }
                self.open();
                None
            }
            Signal::Link { generation, event } => {
                if generation != self.generation || self.handle.is_none() {
                    if self.config.debug {
                        debug!("Ignoring {:?} from detached link {}", event, generation);
                    }
                    return None;
                }
                self.handle_link_event(event)
            }
        }
    }

    fn handle_link_event(&mut self, event: LinkEvent) -> Option<ClientEvent> {
        match event {
            LinkEvent::Opened => {
                if self.closing {
                    return None;
                }
                info!("Connected to {}", self.config.url);
                self.state = ConnectionState::Open;
                self.attempt = 0;
                None
            }
            LinkEvent::Frame(frame) => self.handle_frame(&frame),
            LinkEvent::Closed(code) => {
                if self.closing || code == CLOSE_NORMAL {
                    if self.config.debug {
                        debug!("Link {} closed with code {}", self.generation, code);
                    }
                    self.handle = None;
                    self.state = ConnectionState::Closed;
                    Some(ClientEvent::Closed { code })
                } else {
                    warn!("Abnormal closure (code {}) from {}", code, self.config.url);
                    Some(self.reconnect(ReconnectReason::AbnormalClose(code)))
                }
            }
            LinkEvent::Error(e) => {
                error!("Transport error on {}: {}", self.config.url, e);
                if self.closing {
                    self.handle = None;
                    self.state = ConnectionState::Closed;
                    Some(ClientEvent::Closed { code: CLOSE_ABNORMAL })
                } else {
                    Some(self.reconnect(ReconnectReason::TransportError(e)))
                }
            }
        }
    }

    fn handle_frame(&self, frame: &Frame) -> Option<ClientEvent> {
        let raw = frame.to_text();
        match try_parse(&raw, self.config.debug) {
            Parsed::Raw(text) | Parsed::Json(Value::String(text)) => {
                error!("Failed to unpack message data from {}", text);
                None
            }
            Parsed::Json(value) => {
                if self.config.debug {
                    debug!("Received envelope {}", value);
                }
                Envelope::from_value(value).into_event(self.config.debug)
            }
        }
    }

    fn schedule_reconnect(&mut self, delay: Duration) {
        let generation = self.generation;
        let signal_tx = self.signal_tx.clone();
        self.reconnect_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = signal_tx.send(Signal::ReconnectDue { generation });
        }));
    }

    fn cancel_reconnect(&mut self) {
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.cancel_reconnect();
    }
}
