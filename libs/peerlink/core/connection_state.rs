use std::fmt;

/// Lifecycle state of a connection
///
/// ```text
/// Closed ──open──> Connecting ──on-open──> Open
///                      ^                    │ abnormal close / error
///                      └──delay── Reconnecting <┘
/// any state ──close──> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Closed,
    Connecting,
    Open,
    Reconnecting,
}

impl ConnectionState {
    #[inline]
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }

    #[inline]
    pub fn is_closed(self) -> bool {
        self == ConnectionState::Closed
    }

    /// Connecting, including a pending reconnect
    #[inline]
    pub fn is_connecting(self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Reconnecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Closed => "closed",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Reconnecting => "reconnecting",
        };
        f.write_str(name)
    }
}
