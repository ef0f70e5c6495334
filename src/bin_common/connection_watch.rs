//! Tracks whether the chat connection is live, so shutdown only waits for a
//! closing handshake when there is one to wait for

use std::time::Duration;
use tokio::sync::watch;

/// Liveness flag fed from client listeners
pub struct ConnectionWatch {
    live: watch::Sender<bool>,
}

impl ConnectionWatch {
    pub fn new() -> Self {
        let (live, _) = watch::channel(false);
        Self { live }
    }

    /// Transport opened
    pub fn mark_open(&self) {
        self.live.send_replace(true);
    }

    /// Transport closed or lost
    pub fn mark_down(&self) {
        self.live.send_replace(false);
    }

    pub fn is_live(&self) -> bool {
        *self.live.borrow()
    }

    /// Wait up to `grace` for the connection to go down.
    ///
    /// Returns immediately when nothing is connected. False on timeout.
    pub async fn wait_closed(&self, grace: Duration) -> bool {
        let mut rx = self.live.subscribe();
        let closed = match tokio::time::timeout(grace, rx.wait_for(|live| !*live)).await {
            Ok(result) => result.is_ok(),
            Err(_) => false,
        };
        closed
    }
}

impl Default for ConnectionWatch {
    fn default() -> Self {
        Self::new()
    }
}
