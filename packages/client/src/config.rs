//! Chat client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::{domain::RoomId, error::ClientError};

/// Delay before re-opening a socket that closed abnormally.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Interval between two polls of the staff room listing.
pub const DEFAULT_ROOM_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default HTTP API origin of the storefront backend.
pub const DEFAULT_API_ORIGIN: &str = "http://127.0.0.1:8000";

/// Connection settings shared by the customer widget and the staff console.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// HTTP(S) origin of the storefront API, e.g. `https://shop.example.com`
    pub api_origin: String,
    /// Bearer token for REST calls (staff room listing)
    pub api_token: Option<String>,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,
    /// Staff console room list polling interval
    pub room_poll_interval: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            api_token: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            room_poll_interval: DEFAULT_ROOM_POLL_INTERVAL,
        }
    }
}

impl ChatConfig {
    /// Create a configuration for the given API origin with default timings.
    pub fn new(api_origin: impl Into<String>) -> Self {
        Self {
            api_origin: api_origin.into(),
            ..Self::default()
        }
    }

    /// Build the socket URL for a room.
    ///
    /// The scheme is `wss` iff the API origin is `https`; any path on the
    /// origin is dropped and the room id is percent-encoded as one segment.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidOrigin` if the origin is not an
    /// `http`/`https` URL.
    pub fn chat_socket_url(&self, room: &RoomId) -> Result<String, ClientError> {
        let mut url = self.origin()?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| ClientError::InvalidOrigin(self.api_origin.clone()))?;
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidOrigin(self.api_origin.clone()))?
            .clear()
            .extend(["ws", "api", "chat", room.as_str(), ""]);
        Ok(url.to_string())
    }

    /// URL of the staff room listing endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidOrigin` if the origin is not an
    /// `http`/`https` URL.
    pub fn room_list_url(&self) -> Result<String, ClientError> {
        let mut url = self.origin()?;
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidOrigin(self.api_origin.clone()))?
            .clear()
            .extend(["api", "chat", "rooms", ""]);
        Ok(url.to_string())
    }

    fn origin(&self) -> Result<Url, ClientError> {
        let url = Url::parse(&self.api_origin)
            .map_err(|_| ClientError::InvalidOrigin(self.api_origin.clone()))?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            _ => Err(ClientError::InvalidOrigin(self.api_origin.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::parse(id).unwrap()
    }

    #[test]
    fn test_http_origin_uses_ws_scheme() {
        // テスト項目: http のオリジンでは ws スキームが使われる
        // given (前提条件):
        let config = ChatConfig::new("http://localhost:8000");

        // when (操作):
        let url = config.chat_socket_url(&room("customer_42")).unwrap();

        // then (期待する結果):
        assert_eq!(url, "ws://localhost:8000/ws/api/chat/customer_42/");
    }

    #[test]
    fn test_https_origin_uses_wss_scheme_and_drops_path() {
        // テスト項目: https のオリジンでは wss が使われ、オリジンのパスは無視される
        // given (前提条件):
        let config = ChatConfig::new("https://shop.example.com/api/v1/");

        // when (操作):
        let url = config.chat_socket_url(&room("customer_7")).unwrap();

        // then (期待する結果):
        assert_eq!(url, "wss://shop.example.com/ws/api/chat/customer_7/");
    }

    #[test]
    fn test_room_id_is_percent_encoded() {
        // テスト項目: ルーム ID が 1 つのパスセグメントとしてエンコードされる
        // given (前提条件):
        let config = ChatConfig::new("http://localhost:8000");

        // when (操作):
        let url = config.chat_socket_url(&room("a b/c")).unwrap();

        // then (期待する結果):
        assert_eq!(url, "ws://localhost:8000/ws/api/chat/a%20b%2Fc/");
    }

    #[test]
    fn test_non_http_origin_is_rejected() {
        // テスト項目: http/https 以外のオリジンはエラーになる
        // given (前提条件):
        let config = ChatConfig::new("ftp://files.example.com");

        // when (操作):
        let result = config.chat_socket_url(&room("customer_1"));

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidOrigin(_))));
    }

    #[test]
    fn test_room_list_url() {
        // テスト項目: ルーム一覧 API の URL が組み立てられる
        // given (前提条件):
        let config = ChatConfig::new("https://shop.example.com");

        // when (操作):
        let url = config.room_list_url().unwrap();

        // then (期待する結果):
        assert_eq!(url, "https://shop.example.com/api/chat/rooms/");
    }

    #[test]
    fn test_default_timings() {
        // テスト項目: デフォルトの再接続間隔とポーリング間隔
        // given (前提条件):
        let config = ChatConfig::default();

        // when (操作) / then (期待する結果):
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.room_poll_interval, Duration::from_secs(10));
    }
}
