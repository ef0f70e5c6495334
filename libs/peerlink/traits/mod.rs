//! # PeerLink Traits
//!
//! Core traits and types shared by the client internals:
//!
//! - **Frame**: Raw unit of transport payload
//! - **Connector / FrameSink / FrameStream**: Pluggable transport
//! - **ReconnectionStrategy**: Control reconnection behavior
//! - **PeerLinkError**: Error type for the crate
//!
//! ## Example
//!
//! ```rust,ignore
//! use peerlink::traits::*;
//!
//! struct LoopbackConnector;
//!
//! #[async_trait]
//! impl Connector for LoopbackConnector {
//!     async fn connect(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)> {
//!         // Hand back both halves of your transport
//!     }
//! }
//! ```

pub mod error;
pub mod frame;
pub mod reconnect;
pub mod transport;

// Re-export commonly used types
pub use error::{PeerLinkError, Result};
pub use frame::Frame;
pub use reconnect::{FixedDelay, NeverReconnect, ReconnectionStrategy, DEFAULT_RECONNECT_DELAY};
pub use transport::{
    Connector, FrameSink, FrameStream, Inbound, CLOSE_ABNORMAL, CLOSE_NORMAL, CLOSE_NO_STATUS,
};
