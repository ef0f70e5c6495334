//! Transport seam
//!
//! The connection manager never talks to a socket directly. It asks a
//! [`Connector`] for a fresh `(sink, stream)` pair on every `open` and drives
//! the pair from a dedicated link task:
//!
//! ```text
//! Connector::connect(url) ──> FrameSink   <── outbound frames, close requests
//!                        └──> FrameStream ──> Inbound::Frame / Inbound::Close
//! ```
//!
//! The production implementation is [`crate::WsConnector`]. Tests plug in
//! in-memory connectors to script the remote side.

use crate::error::Result;
use crate::frame::Frame;
use async_trait::async_trait;

/// Close code for a normal, intentional closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code reported when the peer sent a close frame without a status.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Close code reported when the stream ended without any close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Item produced by a [`FrameStream`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A data frame from the remote side
    Frame(Frame),
    /// The remote side closed the connection with this code
    Close(u16),
}

/// Write half of a transport connection
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Write one frame to the transport
    async fn send_frame(&mut self, frame: Frame) -> Result<()>;

    /// Request closure with the given code
    async fn close(&mut self, code: u16) -> Result<()>;
}

/// Read half of a transport connection
#[async_trait]
pub trait FrameStream: Send + 'static {
    /// Wait for the next inbound item
    ///
    /// # Returns
    /// * `Some(Ok(item))` - A frame or a close notification
    /// * `Some(Err(e))` - The transport failed
    /// * `None` - The stream ended without a close frame
    async fn next_inbound(&mut self) -> Option<Result<Inbound>>;
}

/// Factory for transport connections
///
/// Called once per `open`, including every reconnect attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Establish a connection to `url`
    ///
    /// A failure here is treated as a transport error by the connection
    /// manager and schedules a reconnect.
    async fn connect(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)>;
}
