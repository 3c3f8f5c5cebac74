//! Chat messages and conversation entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::read_state::ViewerRole;

/// Server-assigned message identifier, unique within a room's history.
pub type MessageId = i64;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Customer,
    Staff,
    System,
}

/// Reference to an authenticated storefront user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(rename = "username")]
    pub display_name: String,
}

/// Sender identity as delivered by the server.
///
/// Customer messages carry a user reference, staff messages a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SenderIdentity {
    User(UserRef),
    Name(String),
}

impl SenderIdentity {
    /// Name to show next to the message.
    pub fn display_name(&self) -> &str {
        match self {
            Self::User(user) => &user.display_name,
            Self::Name(name) => name,
        }
    }
}

/// One message of a live-chat room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    #[serde(default)]
    pub room_id: String,
    #[serde(rename = "sender_type")]
    pub sender_role: SenderRole,
    #[serde(rename = "sender", default)]
    pub sender_identity: Option<SenderIdentity>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Display string pre-rendered by the server; never parsed.
    #[serde(default)]
    pub formatted_timestamp: String,
    #[serde(default)]
    pub is_read: bool,
}

impl ChatMessage {
    /// Display name of the sender, falling back to the role.
    pub fn sender_name(&self) -> &str {
        match (&self.sender_identity, self.sender_role) {
            (Some(identity), _) => identity.display_name(),
            (None, SenderRole::Customer) => "customer",
            (None, SenderRole::Staff) => "staff",
            (None, SenderRole::System) => "system",
        }
    }
}

/// One turn of the disconnected AI-assistant conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantMessage {
    pub is_user: bool,
    pub content: String,
    /// Unix timestamp (milliseconds) when the entry was recorded locally
    pub sent_at_millis: i64,
}

/// An entry of either conversation the widget can show.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEntry {
    Chat(ChatMessage),
    Assistant(AssistantMessage),
}

impl ConversationEntry {
    /// Whether the entry was written by the person looking at it.
    pub fn is_mine(&self, viewer: ViewerRole) -> bool {
        match self {
            Self::Chat(message) => matches!(
                (viewer, message.sender_role),
                (ViewerRole::Customer, SenderRole::Customer) | (ViewerRole::Staff, SenderRole::Staff)
            ),
            Self::Assistant(message) => message.is_user,
        }
    }
}
