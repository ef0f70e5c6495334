//! House Chat - terminal client for a peer relay chat
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners, shutdown, connection watch)
//! - **config**: YAML configuration with environment overrides
//! - **logging**: tracing subscriber setup
//! - **peerlink**: reconnecting WebSocket client (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use house_chat::bin_common::{load_config_from_env, ConfigType};
//! use house_chat::config::ChatConfig;
//! ```

// Re-export workspace libraries for convenience
pub use peerlink;

pub mod config;
pub mod logging;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod connection_watch;
    pub mod runner;
    pub mod shutdown;

    pub use cli::{load_config_from_env, ConfigType};
    pub use connection_watch::ConnectionWatch;
    pub use runner::{BinaryRunner, RunConfig};
    pub use shutdown::ShutdownManager;
}
