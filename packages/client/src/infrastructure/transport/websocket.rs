//! tokio-tungstenite を使った Connector 実装
//!
//! ## 責務
//!
//! - WebSocket のハンドシェイク
//! - `TransportCommand` をソケットへ書き込む
//! - 受信フレームとクローズを `TransportEvent` として通知する

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::{CloseFrame, Message, frame::coding::CloseCode},
};

use super::{
    ABNORMAL_CLOSURE, Connector, NO_STATUS_RECEIVED, NORMAL_CLOSURE, TransportCommand,
    TransportEvent, TransportHandle,
};

/// Connector backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn open(&self, url: &str) -> TransportHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_socket(url.to_string(), command_rx, event_tx));

        TransportHandle {
            commands: command_tx,
            events: event_rx,
        }
    }
}

/// Drive one socket until it closes.
async fn run_socket(
    url: String,
    mut commands: mpsc::UnboundedReceiver<TransportCommand>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let ws_stream = match connect_async(&url).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            tracing::warn!("Failed to connect to {}: {}", url, e);
            let _ = events.send(TransportEvent::Error(e.to_string()));
            let _ = events.send(TransportEvent::Closed {
                code: ABNORMAL_CLOSURE,
                reason: "Handshake failed".to_string(),
            });
            return;
        }
    };
    tracing::debug!("Socket opened: {}", url);
    let _ = events.send(TransportEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(TransportCommand::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to write to {}: {}", url, e);
                        let _ = events.send(TransportEvent::Error(e.to_string()));
                    }
                }
                Some(TransportCommand::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.clone().into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(frame))).await {
                        tracing::debug!("Close frame not delivered to {}: {}", url, e);
                    }
                    let _ = events.send(TransportEvent::Closed { code, reason });
                    return;
                }
                None => {
                    // Owner dropped the handle: leave cleanly.
                    let frame = CloseFrame {
                        code: CloseCode::from(NORMAL_CLOSURE),
                        reason: "Client gone".into(),
                    };
                    let _ = write.send(Message::Close(Some(frame))).await;
                    return;
                }
            },
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                        .unwrap_or((NO_STATUS_RECEIVED, String::new()));
                    tracing::info!("Server closed {} with code {}", url, code);
                    let _ = events.send(TransportEvent::Closed { code, reason });
                    return;
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!("Ignoring {} bytes of binary data", data.len());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error on {}: {}", url, e);
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    let _ = events.send(TransportEvent::Closed {
                        code: ABNORMAL_CLOSURE,
                        reason: e.to_string(),
                    });
                    return;
                }
                None => {
                    let _ = events.send(TransportEvent::Closed {
                        code: ABNORMAL_CLOSURE,
                        reason: "Connection lost".to_string(),
                    });
                    return;
                }
            },
        }
    }
}
