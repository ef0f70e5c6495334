//! In-memory transport for unit tests
//!
//! Every `connect` hands the test a [`RemotePeer`] holding the far ends of the
//! link's channels, so tests can script inbound frames, closures and errors
//! and observe what the client wrote.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::{PeerLinkError, Result};
use crate::frame::Frame;
use crate::traits::{Connector, FrameSink, FrameStream, Inbound};

/// What the client did to its sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SinkOp {
    Frame(Frame),
    Close(u16),
}

/// Remote side of one in-memory link
pub(crate) struct RemotePeer {
    pub to_client: UnboundedSender<Result<Inbound>>,
    pub from_client: UnboundedReceiver<SinkOp>,
}

impl RemotePeer {
    pub fn push_text(&self, text: &str) {
        let _ = self.to_client.send(Ok(Inbound::Frame(Frame::Text(text.to_string()))));
    }

    pub fn push_close(&self, code: u16) {
        let _ = self.to_client.send(Ok(Inbound::Close(code)));
    }

    pub fn push_error(&self, message: &str) {
        let _ = self
            .to_client
            .send(Err(PeerLinkError::WebSocket(message.to_string())));
    }
}

#[derive(Clone)]
pub(crate) struct MemoryConnector {
    connects: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
    peers_tx: UnboundedSender<RemotePeer>,
}

impl MemoryConnector {
    pub fn new() -> (Self, UnboundedReceiver<RemotePeer>) {
        let (peers_tx, peers_rx) = unbounded_channel();
        let connector = Self {
            connects: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(AtomicUsize::new(0)),
            peers_tx,
        };
        (connector, peers_rx)
    }

    /// Number of connect attempts so far, failed ones included
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Make the next `n` connect attempts fail
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }
}

struct MemorySink {
    tx: UnboundedSender<SinkOp>,
}

struct MemoryStream {
    rx: UnboundedReceiver<Result<Inbound>>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_frame(&mut self, frame: Frame) -> Result<()> {
        self.tx
            .send(SinkOp::Frame(frame))
            .map_err(|_| PeerLinkError::ConnectionClosed("remote dropped".into()))
    }

    async fn close(&mut self, code: u16) -> Result<()> {
        self.tx
            .send(SinkOp::Close(code))
            .map_err(|_| PeerLinkError::ConnectionClosed("remote dropped".into()))
    }
}

#[async_trait]
impl FrameStream for MemoryStream {
    async fn next_inbound(&mut self) -> Option<Result<Inbound>> {
        self.rx.recv().await
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, _url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PeerLinkError::WebSocket("connection refused".into()));
        }

        let (to_client, client_rx) = unbounded_channel();
        let (client_tx, from_client) = unbounded_channel();
        let _ = self.peers_tx.send(RemotePeer {
            to_client,
            from_client,
        });

        Ok((
            Box::new(MemorySink { tx: client_tx }),
            Box::new(MemoryStream { rx: client_rx }),
        ))
    }
}
