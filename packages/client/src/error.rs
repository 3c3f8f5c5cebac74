//! Error types for the chat transport.

use thiserror::Error;

/// Client-side chat errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// No authenticated participant yet, so there is no room to join
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A frame was submitted while the transport was not open
    #[error("Not connected to chat server")]
    NotConnected,

    /// The configured API origin cannot be turned into a socket URL
    #[error("Invalid API origin '{0}'")]
    InvalidOrigin(String),

    /// An inbound frame could not be decoded
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// The room listing endpoint failed
    #[error("Room directory request failed: {0}")]
    Directory(#[from] reqwest::Error),
}
