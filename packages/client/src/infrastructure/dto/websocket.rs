//! WebSocket frame DTOs for the chat protocol.
//!
//! Frames are internally tagged JSON objects (`{"type": "chat_message", ...}`).

use serde::{Deserialize, Serialize};

use crate::{
    domain::{ChatMessage, ReaderRole},
    error::ClientError,
};

/// Payload of a `chat_read` frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub reader: ReaderRole,
}

/// Frames pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Backlog sent once after the socket opens
    ChatHistory { data: Vec<ChatMessage> },
    /// A single live message
    ChatMessage { message: ChatMessage },
    /// Echo of a bulk read update
    ChatRead { data: ReadReceipt },
    /// Server-side error notification
    Error { message: String },
}

/// Frames sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    ChatMessage { content: String },
    MarkRead { is_staff_interface: bool },
}

impl InboundFrame {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MalformedFrame` on invalid JSON or an unknown `type`.
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl OutboundFrame {
    /// Encode the frame as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MalformedFrame` if serialization fails.
    pub fn to_json(&self) -> Result<String, ClientError> {
        Ok(serde_json::to_string(self)?)
    }
}
