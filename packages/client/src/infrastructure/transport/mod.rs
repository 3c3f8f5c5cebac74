//! Socket transport abstraction.
//!
//! ## 概要
//!
//! `Connector` はブラウザの WebSocket と同じ形のトランスポートを開きます。
//! `open` は即座に返り、接続の成否は後からイベントとして届きます。
//!
//! - 送信: `TransportHandle::commands` に `TransportCommand` を送る
//! - 受信: `TransportHandle::events` から `TransportEvent` を受け取る
//!
//! ## 実装
//!
//! - `websocket`: tokio-tungstenite を使った実装

pub mod websocket;

#[cfg(test)]
pub(crate) mod testing;

use tokio::sync::mpsc;

pub use websocket::WebSocketConnector;

/// Close code of an intentional shutdown.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close code reported when the socket died without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code used when the peer sent a close frame without a status.
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Something the transport reports to its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed
    Opened,
    /// A text frame arrived
    Text(String),
    /// Transport-level failure; a `Closed` event follows when the socket dies
    Error(String),
    /// The socket is gone
    Closed { code: u16, reason: String },
}

/// Something the owner asks the transport to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Text(String),
    Close { code: u16, reason: String },
}

/// Channel pair connecting a transport to its owner
#[derive(Debug)]
pub struct TransportHandle {
    pub commands: mpsc::UnboundedSender<TransportCommand>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Opens transports to socket URLs.
pub trait Connector: Send + Sync {
    /// Start opening a transport; progress is reported through the handle.
    fn open(&self, url: &str) -> TransportHandle;
}
