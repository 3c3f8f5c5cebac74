//! Message formatting utilities for terminal display.

use velochat_shared::time::{millis_to_rfc3339, short_local_time};

use crate::{
    connection::ConnectionState,
    domain::{AssistantMessage, ChatMessage, ConversationEntry, ReadSummary, SenderRole, ViewerRole},
    infrastructure::dto::http::RoomSummary,
};

const RULE: &str = "============================================================";

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one conversation entry relative to the viewer
    ///
    /// # Arguments
    ///
    /// * `entry` - Live-chat message or assistant turn
    /// * `viewer` - Interface the entry is shown in (decides "mine")
    ///
    /// # Returns
    ///
    /// A single formatted line
    pub fn format_entry(entry: &ConversationEntry, viewer: ViewerRole) -> String {
        match entry {
            ConversationEntry::Chat(message) => {
                Self::format_chat_message(message, entry.is_mine(viewer))
            }
            ConversationEntry::Assistant(message) => Self::format_assistant_message(message),
        }
    }

    /// Format a live-chat message
    ///
    /// Own messages carry a read mark: `✓` once sent, `✓✓` once the other
    /// side has read them.
    pub fn format_chat_message(message: &ChatMessage, is_mine: bool) -> String {
        if message.sender_role == SenderRole::System {
            return format!("* {} *", message.content);
        }

        let time = if message.formatted_timestamp.is_empty() {
            short_local_time(message.timestamp)
        } else {
            message.formatted_timestamp.clone()
        };

        if is_mine {
            let mark = if message.is_read { "✓✓" } else { "✓" };
            format!("me: {}  [{}] {}", message.content, time, mark)
        } else {
            format!("@{}: {}  [{}]", message.sender_name(), message.content, time)
        }
    }

    pub fn format_assistant_message(message: &AssistantMessage) -> String {
        let who = if message.is_user { "me" } else { "@assistant" };
        format!(
            "{}: {}  [{}]",
            who,
            message.content,
            millis_to_rfc3339(message.sent_at_millis)
        )
    }

    /// Format a whole transcript between two rules
    pub fn format_transcript(entries: &[ConversationEntry], viewer: ViewerRole) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", RULE));
        if entries.is_empty() {
            output.push_str("(No messages yet)\n");
        }
        for entry in entries {
            output.push_str(&Self::format_entry(entry, viewer));
            output.push('\n');
        }
        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format the staff room list
    ///
    /// # Arguments
    ///
    /// * `rooms` - Latest polled list
    /// * `selected` - Room currently attached, marked with `>`
    pub fn format_room_list(rooms: &[RoomSummary], selected: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\nRooms:\n", RULE));
        if rooms.is_empty() {
            output.push_str("(No rooms)\n");
        }
        for (index, room) in rooms.iter().enumerate() {
            let cursor = if selected == Some(room.room_id.as_str()) { ">" } else { " " };
            let presence = if room.is_online { "●" } else { "○" };
            let unread = if room.unread_count > 0 {
                format!(" ({} unread)", room.unread_count)
            } else {
                String::new()
            };
            output.push_str(&format!(
                "{} {}. {} {} [{}]{}\n",
                cursor,
                index + 1,
                presence,
                room.customer_name,
                room.room_id,
                unread
            ));
            if let Some(preview) = &room.last_message {
                output.push_str(&format!("      {}\n", preview));
            }
        }
        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format the connection error banner
    pub fn format_connection_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    pub fn format_state(state: ConnectionState) -> String {
        format!("\n-- chat {} --\n", state)
    }

    /// Format the unread counter of the viewer
    pub fn format_unread(summary: &ReadSummary, viewer: ViewerRole) -> Option<String> {
        match summary.unread_for(viewer) {
            0 => None,
            count => Some(format!("{} unread", count)),
        }
    }
}
