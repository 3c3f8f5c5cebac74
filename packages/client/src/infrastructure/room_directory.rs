//! Staff room listing over REST.
//!
//! The staff console learns which rooms exist by polling
//! `GET {api_origin}/api/chat/rooms/`. The list is polled, not pushed.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{sync::watch, task::JoinHandle};

use crate::{config::ChatConfig, error::ClientError, infrastructure::dto::http::RoomSummary};

/// Source of the staff room list
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Fetch the current room list
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, ClientError>;
}

/// RoomDirectory backed by the storefront REST API
pub struct HttpRoomDirectory {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpRoomDirectory {
    /// Create a directory for the configured API origin.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidOrigin` if the origin is unusable.
    pub fn new(config: &ChatConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: config.room_list_url()?,
            token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl RoomDirectory for HttpRoomDirectory {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, ClientError> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let rooms = request
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RoomSummary>>()
            .await?;
        Ok(rooms)
    }
}

/// Poll a directory on a fixed interval and publish the latest list.
///
/// The first poll happens immediately. A failed poll is logged and the last
/// good list stays published. The task stops once every receiver is dropped.
pub fn spawn_room_poller(
    directory: Arc<dyn RoomDirectory>,
    interval: Duration,
) -> (watch::Receiver<Vec<RoomSummary>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(Vec::new());

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match directory.list_rooms().await {
                Ok(rooms) => {
                    tracing::debug!("Room list refreshed: {} rooms", rooms.len());
                    if tx.send(rooms).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to refresh room list: {}", e);
                    if tx.is_closed() {
                        break;
                    }
                }
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(room_id: &str, unread_count: u32) -> RoomSummary {
        RoomSummary {
            room_id: room_id.to_string(),
            customer_name: format!("name of {room_id}"),
            customer_avatar: None,
            last_message: Some("hi".to_string()),
            unread_count,
            is_online: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_publishes_first_list_immediately() {
        // テスト項目: 起動直後に 1 回目のポーリング結果が公開される
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_list_rooms()
            .returning(|| Ok(vec![summary("customer_1", 2)]));

        // when (操作):
        let (mut rx, handle) = spawn_room_poller(Arc::new(directory), Duration::from_secs(10));
        rx.changed().await.unwrap();

        // then (期待する結果):
        assert_eq!(*rx.borrow(), vec![summary("customer_1", 2)]);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_polls_on_interval() {
        // テスト項目: 一定間隔で再取得され、最新の一覧に置き換わる
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_list_rooms()
            .times(1)
            .returning(|| Ok(vec![summary("customer_1", 0)]));
        directory
            .expect_list_rooms()
            .returning(|| Ok(vec![summary("customer_1", 0), summary("customer_2", 4)]));
        let (mut rx, handle) = spawn_room_poller(Arc::new(directory), Duration::from_secs(10));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);

        // when (操作):
        tokio::time::sleep(Duration::from_secs(10)).await;
        rx.changed().await.unwrap();

        // then (期待する結果):
        assert_eq!(rx.borrow().len(), 2);
        assert_eq!(rx.borrow()[1].unread_count, 4);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_keeps_last_list_on_failure() {
        // テスト項目: ポーリング失敗時は直前の一覧が保持される
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_list_rooms()
            .times(1)
            .returning(|| Ok(vec![summary("customer_1", 1)]));
        directory
            .expect_list_rooms()
            .returning(|| Err(ClientError::InvalidOrigin("shop.test".to_string())));
        let (mut rx, handle) = spawn_room_poller(Arc::new(directory), Duration::from_secs(10));
        rx.changed().await.unwrap();

        // when (操作):
        tokio::time::sleep(Duration::from_secs(25)).await;

        // then (期待する結果):
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow(), vec![summary("customer_1", 1)]);
        handle.abort();
    }
}
