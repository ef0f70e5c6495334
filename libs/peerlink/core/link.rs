//! Link task: one transport handle
//!
//! Each `open` spawns a link task that connects through the [`Connector`] and
//! forwards everything that happens on the transport into the client task as
//! a [`Signal`] tagged with the handle's generation:
//!
//! ```text
//! ┌───────────────┐  LinkCommand   ┌──────────────┐  Signal::Link{gen, ..}  ┌──────────────┐
//! │  LinkHandle   │ ─────────────> │  Link task   │ ──────────────────────> │ Client task  │
//! │ (owned by the │                │ (tokio spawn)│                         │  (manager +  │
//! │   manager)    │                └──────────────┘                         │  dispatcher) │
//! └───────────────┘                                                         └──────────────┘
//! ```
//!
//! Dropping the [`LinkHandle`] detaches it: the task closes its sink and exits,
//! and any signal it raced out before noticing carries a stale generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::frame::Frame;
use crate::traits::{Connector, Inbound, CLOSE_ABNORMAL, CLOSE_NORMAL};

/// Transport-level event from one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Transport is open
    Opened,
    /// A frame arrived
    Frame(Frame),
    /// Transport closed with this code
    Closed(u16),
    /// Transport failed
    Error(String),
}

/// Input to the client task from links and the reconnect timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Link { generation: u64, event: LinkEvent },
    ReconnectDue { generation: u64 },
}

#[derive(Debug)]
enum LinkCommand {
    Send(Frame),
    Close(u16),
}

/// Owning handle to a running link task
#[derive(Debug)]
pub struct LinkHandle {
    generation: u64,
    command_tx: UnboundedSender<LinkCommand>,
    closed: Arc<AtomicBool>,
}

impl LinkHandle {
    /// Spawn a link task for `url`
    pub fn spawn(
        connector: Arc<dyn Connector>,
        url: String,
        generation: u64,
        signal_tx: UnboundedSender<Signal>,
    ) -> Self {
        let (command_tx, command_rx) = unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        {
            let closed = Arc::clone(&closed);
            tokio::spawn(async move {
                run_link(connector, url, generation, signal_tx, command_rx, &closed).await;
                closed.store(true, Ordering::Release);
                debug!("Link {} task exiting", generation);
            });
        }

        Self {
            generation,
            command_tx,
            closed,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Queue a frame for writing; false if the task is gone
    pub fn send(&self, frame: Frame) -> bool {
        self.command_tx.send(LinkCommand::Send(frame)).is_ok()
    }

    /// Request closure with `code`
    pub fn close(&self, code: u16) {
        let _ = self.command_tx.send(LinkCommand::Close(code));
    }

    /// True once the transport has closed, failed or the task ended
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

async fn run_link(
    connector: Arc<dyn Connector>,
    url: String,
    generation: u64,
    signal_tx: UnboundedSender<Signal>,
    mut command_rx: UnboundedReceiver<LinkCommand>,
    closed: &AtomicBool,
) {
    let signal = |event: LinkEvent| {
        let _ = signal_tx.send(Signal::Link { generation, event });
    };

    // Connect, unless the handle is closed or dropped first
    let connected = tokio::select! {
        result = connector.connect(&url) => result,
        cmd = command_rx.recv() => {
            match cmd {
                Some(LinkCommand::Close(_)) => {
                    debug!("Link {} closed while connecting", generation);
                    closed.store(true, Ordering::Release);
                    signal(LinkEvent::Closed(CLOSE_NORMAL));
                }
                Some(LinkCommand::Send(_)) => {
                    warn!("Link {} dropped a frame queued before connecting", generation);
                }
                None => debug!("Link {} detached while connecting", generation),
            }
            return;
        }
    };

    let (mut sink, mut stream) = match connected {
        Ok(pair) => pair,
        Err(e) => {
            closed.store(true, Ordering::Release);
            signal(LinkEvent::Error(e.to_string()));
            return;
        }
    };

    signal(LinkEvent::Opened);

    loop {
        tokio::select! {
            inbound = stream.next_inbound() => {
                match inbound {
                    Some(Ok(Inbound::Frame(frame))) => signal(LinkEvent::Frame(frame)),
                    Some(Ok(Inbound::Close(code))) => {
                        closed.store(true, Ordering::Release);
                        signal(LinkEvent::Closed(code));
                        break;
                    }
                    Some(Err(e)) => {
                        closed.store(true, Ordering::Release);
                        signal(LinkEvent::Error(e.to_string()));
                        break;
                    }
                    None => {
                        closed.store(true, Ordering::Release);
                        signal(LinkEvent::Closed(CLOSE_ABNORMAL));
                        break;
                    }
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(LinkCommand::Send(frame)) => {
                        if let Err(e) = sink.send_frame(frame).await {
                            closed.store(true, Ordering::Release);
                            signal(LinkEvent::Error(e.to_string()));
                            break;
                        }
                    }
                    Some(LinkCommand::Close(code)) => {
                        // Keep reading until the remote acknowledges
                        if let Err(e) = sink.close(code).await {
                            closed.store(true, Ordering::Release);
                            signal(LinkEvent::Error(e.to_string()));
                            break;
                        }
                    }
                    None => {
                        debug!("Link {} detached, releasing transport", generation);
                        let _ = sink.close(CLOSE_NORMAL).await;
                        break;
                    }
                }
            }
        }
    }
}
