//! UseCase: ルームの切り替え
//!
//! 閲覧者（顧客またはスタッフ）に対応するルーム ID を決め、
//! `ConnectionManager` をそのルームに向けます。
//!
//! ストアのクリア、古いトランスポートのクローズ、重複排除インデックスのリセットは
//! `ConnectionManager::connect` の中で 1 つのロックのもとで行われるため、
//! 呼び出し側から見て途中の状態は見えません。

use crate::{
    connection::ConnectionManager,
    domain::{AuthSnapshot, RoomId, customer_room_key},
    error::ClientError,
};

/// Points one connection manager at the viewer's current room
pub struct RoomMultiplexer {
    manager: ConnectionManager,
    selected: Option<String>,
}

impl RoomMultiplexer {
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            manager,
            selected: None,
        }
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    /// Room key last requested by the viewer.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Switch to a room, or leave the current one with `None`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of `ConnectionManager::connect`.
    pub async fn select(&mut self, room_key: Option<&str>) -> Result<(), ClientError> {
        let Some(key) = room_key else {
            self.selected = None;
            self.manager.disconnect().await;
            return Ok(());
        };

        let room = match RoomId::parse(key) {
            Ok(room) => room,
            Err(_) => {
                // the manager still tears the old room down and raises the banner
                self.selected = None;
                return self.manager.connect(key).await;
            }
        };
        if self.selected() != Some(room.as_str()) {
            tracing::info!("Switching room to '{}'", room);
        }
        self.manager.connect(room.as_str()).await?;
        self.selected = Some(room.as_str().to_string());
        Ok(())
    }

    /// Follow the customer's auth session to their own room.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` while nobody is signed in.
    pub async fn follow_auth(&mut self, auth: &AuthSnapshot) -> Result<(), ClientError> {
        let key = customer_room_key(auth);
        self.select(Some(&key)).await
    }

    /// Leave the room, e.g. when the adapter goes away.
    pub async fn release(&mut self) {
        // select(None) never fails
        let _ = self.select(None).await;
    }
}
