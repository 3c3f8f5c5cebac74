//! Notifications emitted by the connection manager.

use crate::domain::{ChatMessage, ReaderRole};

use super::ConnectionState;

/// Change notification for presentation adapters.
///
/// Adapters re-render from the manager's snapshots; the payloads only say
/// what changed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    StateChanged(ConnectionState),
    /// The message list was emptied (room switch or teardown)
    StoreCleared,
    HistoryReplaced { count: usize },
    MessageAppended(ChatMessage),
    ReadApplied { reader: ReaderRole, updated: usize },
    ConnectionError(String),
}
