//! Viewer and reader roles, and the read state derived from messages.

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, SenderRole};

/// Which interface is attached to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerRole {
    /// The storefront's customer chat widget
    Customer,
    /// The staff chat console
    Staff,
}

impl ViewerRole {
    /// Value of the `is_staff_interface` flag sent with `mark_read`.
    pub fn is_staff_interface(self) -> bool {
        matches!(self, Self::Staff)
    }
}

/// Who read the room, as echoed by the server in `chat_read`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderRole {
    Staff,
    Customer,
}

impl ReaderRole {
    /// The sender role whose messages this reader marks as read.
    pub fn read_target(self) -> SenderRole {
        match self {
            Self::Staff => SenderRole::Customer,
            Self::Customer => SenderRole::Staff,
        }
    }
}

/// Unread counters per authoring role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadSummary {
    pub unread_from_customer: usize,
    pub unread_from_staff: usize,
}

impl ReadSummary {
    /// Scan a message list and count unread messages per role.
    pub fn scan(messages: &[ChatMessage]) -> Self {
        messages
            .iter()
            .filter(|m| !m.is_read)
            .fold(Self::default(), |mut summary, m| {
                match m.sender_role {
                    SenderRole::Customer => summary.unread_from_customer += 1,
                    SenderRole::Staff => summary.unread_from_staff += 1,
                    SenderRole::System => {}
                }
                summary
            })
    }

    /// Unread messages the given viewer has not seen yet.
    pub fn unread_for(&self, viewer: ViewerRole) -> usize {
        match viewer {
            ViewerRole::Customer => self.unread_from_staff,
            ViewerRole::Staff => self.unread_from_customer,
        }
    }
}
