//! Connection lifecycle states.

use std::fmt;

/// Lifecycle of the transport owned by a `ConnectionManager`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    /// A transport is being opened or is open.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "connected",
            Self::Closing => "closing",
            Self::Closed => "disconnected",
        };
        f.write_str(label)
    }
}
