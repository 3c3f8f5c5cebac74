//! Staff chat console.
//!
//! Shows the polled room list and the conversation of the selected room.

use tokio::sync::watch;

use crate::{
    connection::ConnectionManager,
    domain::ConversationEntry,
    error::ClientError,
    infrastructure::dto::http::RoomSummary,
    usecase::{ReadReconciler, ReadTrigger, RoomMultiplexer},
};

pub struct StaffConsole {
    multiplexer: RoomMultiplexer,
    rooms: watch::Receiver<Vec<RoomSummary>>,
    reconciler: ReadReconciler,
}

impl StaffConsole {
    /// # Arguments
    ///
    /// * `manager` - Connection manager created for `ViewerRole::Staff`
    /// * `rooms` - Room list published by the room poller
    pub fn new(manager: ConnectionManager, rooms: watch::Receiver<Vec<RoomSummary>>) -> Self {
        Self {
            multiplexer: RoomMultiplexer::new(manager),
            rooms,
            reconciler: ReadReconciler::new(),
        }
    }

    pub fn manager(&self) -> &ConnectionManager {
        self.multiplexer.manager()
    }

    /// Latest room list.
    pub fn rooms(&self) -> Vec<RoomSummary> {
        self.rooms.borrow().clone()
    }

    /// Wait until the poller publishes a new room list.
    ///
    /// Returns `false` once the poller has stopped.
    pub async fn rooms_changed(&mut self) -> bool {
        self.rooms.changed().await.is_ok()
    }

    pub fn selected(&self) -> Option<&str> {
        self.multiplexer.selected()
    }

    /// Resolve a 1-based position in the room list to its room id.
    pub fn room_at(&self, position: usize) -> Option<String> {
        let index = position.checked_sub(1)?;
        self.rooms.borrow().get(index).map(|room| room.room_id.clone())
    }

    /// Open the conversation of a room.
    ///
    /// # Errors
    ///
    /// Propagates the errors of `ConnectionManager::connect`.
    pub async fn select_room(&mut self, room_id: &str) -> Result<(), ClientError> {
        if self.selected() != Some(room_id.trim()) {
            self.reconciler.reset();
        }
        self.multiplexer.select(Some(room_id)).await
    }

    pub async fn leave_room(&mut self) {
        self.reconciler.reset();
        self.multiplexer.release().await;
    }

    /// Reply in the selected room.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotConnected` when no room is open.
    pub async fn submit(&mut self, content: &str) -> Result<(), ClientError> {
        self.multiplexer.manager().send(content).await
    }

    pub async fn entries(&self) -> Vec<ConversationEntry> {
        self.multiplexer
            .manager()
            .messages()
            .await
            .into_iter()
            .map(ConversationEntry::Chat)
            .collect()
    }

    /// Emit `mark_read` if the console's inputs changed and now call for it.
    ///
    /// Every new message in the open room triggers another `mark_read`.
    pub async fn sync_read_state(&mut self) -> Result<bool, ClientError> {
        let manager = self.multiplexer.manager();
        let trigger = ReadTrigger::Staff {
            room_selected: self.multiplexer.selected().is_some(),
            message_count: manager.message_count().await,
            state: manager.state().await,
        };
        if !self.reconciler.observe(trigger) {
            return Ok(false);
        }
        manager.mark_read().await?;
        Ok(true)
    }

    pub async fn close(&mut self) {
        self.multiplexer.release().await;
    }
}
