//! Connection manager: one live transport per chat room.
//!
//! The manager owns the socket for the room a presentation adapter is looking
//! at, the message store of that room and the connection error banner.
//! Transport events are applied under a single lock, so the store never
//! mixes messages of two rooms.
//!
//! Every transport is tagged with an epoch. Switching rooms or reopening
//! bumps the epoch; events from an older transport and reconnect timers that
//! captured an older epoch are ignored.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{
    config::ChatConfig,
    domain::{ChatMessage, ReadSummary, RoomId, ViewerRole},
    error::ClientError,
    infrastructure::{
        dto::websocket::{InboundFrame, OutboundFrame},
        transport::{ABNORMAL_CLOSURE, Connector, NORMAL_CLOSURE, TransportCommand, TransportEvent},
    },
    store::MessageStore,
};

use super::{ChatEvent, ConnectionState};

/// Banner text for a transport-level failure.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Connection error occurred";

/// Handle to the chat connection of one presentation adapter.
///
/// Cloning is cheap; all clones share the same session.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Arc<dyn Connector>,
    config: ChatConfig,
    viewer: ViewerRole,
    session: Mutex<Session>,
    events: mpsc::UnboundedSender<ChatEvent>,
}

#[derive(Default)]
struct Session {
    state: ConnectionState,
    /// Room the adapter wants to be attached to
    room: Option<RoomId>,
    /// Tag of the current transport
    epoch: u64,
    commands: Option<mpsc::UnboundedSender<TransportCommand>>,
    store: MessageStore,
    connection_error: Option<String>,
    reconnect_attempts: u32,
}

impl ConnectionManager {
    /// Create a manager and the receiver of its change notifications.
    pub fn new(
        connector: Arc<dyn Connector>,
        config: ChatConfig,
        viewer: ViewerRole,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let manager = Self {
            inner: Arc::new(Inner {
                connector,
                config,
                viewer,
                session: Mutex::new(Session::default()),
                events,
            }),
        };
        (manager, events_rx)
    }

    /// Attach to a room, opening a transport if needed.
    ///
    /// A redundant call for the room that is already connecting or open does
    /// nothing. A different room closes the old transport with a normal
    /// closure and clears the store before the new transport is opened.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotAuthenticated` - the key is empty or the sentinel;
    ///   no transport is opened
    /// * `ClientError::InvalidOrigin` - the configured origin is unusable
    pub async fn connect(&self, room_key: &str) -> Result<(), ClientError> {
        let room = match RoomId::parse(room_key) {
            Ok(room) => room,
            Err(e) => {
                let mut session = self.inner.session.lock().await;
                if session.room.is_some() {
                    self.detach(&mut session, "Signed out");
                }
                tracing::debug!("Not connecting: no valid room (key '{}')", room_key);
                self.set_error(&mut session, e.to_string());
                return Err(e);
            }
        };
        let url = self.inner.config.chat_socket_url(&room)?;

        let mut session = self.inner.session.lock().await;
        if session.room.as_ref() == Some(&room) && session.state.is_live() {
            tracing::debug!("Already attached to room '{}'", room);
            return Ok(());
        }
        self.attach(&mut session, room, &url);
        Ok(())
    }

    /// Close the transport cleanly and forget the room.
    pub async fn disconnect(&self) {
        let mut session = self.inner.session.lock().await;
        self.detach(&mut session, "Chat closed");
    }

    /// Send a chat message to the room.
    ///
    /// Nothing is queued: while the transport is not open the call only
    /// raises the connection error banner.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotConnected` if the transport is not open.
    pub async fn send(&self, content: &str) -> Result<(), ClientError> {
        let frame = OutboundFrame::ChatMessage {
            content: content.to_string(),
        };
        let mut session = self.inner.session.lock().await;
        if let Err(e) = Self::transmit(&session, &frame) {
            self.set_error(&mut session, e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// Ask the server to mark the other side's messages as read.
    ///
    /// The local store changes only when the server echoes `chat_read`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotConnected` if the transport is not open.
    pub async fn mark_read(&self) -> Result<(), ClientError> {
        let frame = OutboundFrame::MarkRead {
            is_staff_interface: self.inner.viewer.is_staff_interface(),
        };
        let session = self.inner.session.lock().await;
        Self::transmit(&session, &frame)?;
        tracing::debug!(
            "mark_read sent for room '{}'",
            session.room.as_ref().map(RoomId::as_str).unwrap_or_default()
        );
        Ok(())
    }

    /// Interface this manager serves.
    pub fn viewer(&self) -> ViewerRole {
        self.inner.viewer
    }

    pub async fn state(&self) -> ConnectionState {
        self.inner.session.lock().await.state
    }

    pub async fn room(&self) -> Option<RoomId> {
        self.inner.session.lock().await.room.clone()
    }

    pub async fn connection_error(&self) -> Option<String> {
        self.inner.session.lock().await.connection_error.clone()
    }

    /// Copy of the message list of the attached room.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.inner.session.lock().await.store.messages().to_vec()
    }

    pub async fn message_count(&self) -> usize {
        self.inner.session.lock().await.store.len()
    }

    pub async fn read_summary(&self) -> ReadSummary {
        self.inner.session.lock().await.store.read_summary()
    }

    fn attach(&self, session: &mut Session, room: RoomId, url: &str) {
        if session.room.as_ref() != Some(&room) {
            session.store.reset();
            session.reconnect_attempts = 0;
            self.emit(ChatEvent::StoreCleared);
        }
        if let Some(commands) = session.commands.take() {
            let _ = commands.send(TransportCommand::Close {
                code: NORMAL_CLOSURE,
                reason: "Switching rooms".to_string(),
            });
        }

        session.epoch += 1;
        let epoch = session.epoch;
        session.room = Some(room.clone());

        tracing::info!("Connecting to {} (room '{}')", url, room);
        let handle = self.inner.connector.open(url);
        session.commands = Some(handle.commands);
        self.set_state(session, ConnectionState::Connecting);

        tokio::spawn(self.clone().pump(epoch, room, handle.events));
    }

    fn detach(&self, session: &mut Session, reason: &str) {
        if let Some(room) = session.room.take() {
            tracing::info!("Leaving room '{}': {}", room, reason);
            session.store.reset();
            self.emit(ChatEvent::StoreCleared);
        }
        session.reconnect_attempts = 0;
        if let Some(commands) = session.commands.take() {
            let _ = commands.send(TransportCommand::Close {
                code: NORMAL_CLOSURE,
                reason: reason.to_string(),
            });
            self.set_state(session, ConnectionState::Closing);
        }
    }

    /// Forward the events of one transport until it closes or goes stale.
    async fn pump(
        self,
        epoch: u64,
        room: RoomId,
        mut events: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        loop {
            let event = events.recv().await.unwrap_or(TransportEvent::Closed {
                code: ABNORMAL_CLOSURE,
                reason: "Transport dropped".to_string(),
            });
            if !self.handle_transport_event(epoch, &room, event).await {
                return;
            }
        }
    }

    /// Apply one transport event; returns `false` once the transport is done.
    async fn handle_transport_event(&self, epoch: u64, room: &RoomId, event: TransportEvent) -> bool {
        let mut session = self.inner.session.lock().await;
        if session.epoch != epoch {
            tracing::debug!("Dropping event of a replaced transport (room '{}')", room);
            return false;
        }

        match event {
            TransportEvent::Opened => {
                tracing::info!("Connected to room '{}'", room);
                session.connection_error = None;
                session.reconnect_attempts = 0;
                self.set_state(&mut session, ConnectionState::Open);
                true
            }
            TransportEvent::Text(text) => {
                if session.state == ConnectionState::Closing {
                    tracing::debug!("Dropping frame received while closing room '{}'", room);
                } else {
                    self.apply_frame(&mut session, room, &text);
                }
                true
            }
            TransportEvent::Error(e) => {
                tracing::warn!("Transport error on room '{}': {}", room, e);
                self.set_error(&mut session, TRANSPORT_ERROR_MESSAGE.to_string());
                true
            }
            TransportEvent::Closed { code, reason } => {
                session.commands = None;
                self.set_state(&mut session, ConnectionState::Closed);

                if code != NORMAL_CLOSURE && session.room.as_ref() == Some(room) {
                    session.reconnect_attempts += 1;
                    tracing::warn!(
                        "Room '{}' closed with code {} ({}). Reconnecting in {:?} (attempt {})",
                        room,
                        code,
                        reason,
                        self.inner.config.reconnect_delay,
                        session.reconnect_attempts
                    );
                    self.schedule_reconnect(epoch, room.clone());
                } else {
                    tracing::info!("Room '{}' closed with code {}", room, code);
                }
                false
            }
        }
    }

    fn apply_frame(&self, session: &mut Session, room: &RoomId, text: &str) {
        let frame = match InboundFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Dropping frame on room '{}': {}", room, e);
                return;
            }
        };

        match frame {
            InboundFrame::ChatHistory { data } => {
                session.store.ingest_history(data);
                let count = session.store.len();
                tracing::debug!("History of room '{}' loaded: {} messages", room, count);
                self.emit(ChatEvent::HistoryReplaced { count });
            }
            InboundFrame::ChatMessage { message } => {
                if !message.room_id.is_empty() && message.room_id != room.as_str() {
                    tracing::warn!(
                        "Dropping message {} addressed to room '{}' while attached to '{}'",
                        message.id,
                        message.room_id,
                        room
                    );
                    return;
                }
                if session.store.ingest_live(message.clone()) {
                    self.emit(ChatEvent::MessageAppended(message));
                } else {
                    tracing::debug!("Duplicate message {} ignored", message.id);
                }
            }
            InboundFrame::ChatRead { data } => {
                let updated = session.store.apply_read_transition(data.reader);
                self.emit(ChatEvent::ReadApplied {
                    reader: data.reader,
                    updated,
                });
            }
            InboundFrame::Error { message } => {
                tracing::warn!("Server error on room '{}': {}", room, message);
                self.set_error(session, message);
            }
        }
    }

    fn schedule_reconnect(&self, epoch: u64, room: RoomId) {
        let manager = self.clone();
        let delay = self.inner.config.reconnect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.reconnect_if_current(epoch, room).await;
        });
    }

    async fn reconnect_if_current(&self, epoch: u64, room: RoomId) {
        let mut session = self.inner.session.lock().await;
        if session.epoch != epoch
            || session.room.as_ref() != Some(&room)
            || session.state != ConnectionState::Closed
        {
            tracing::debug!("Skipping stale reconnect for room '{}'", room);
            return;
        }
        match self.inner.config.chat_socket_url(&room) {
            Ok(url) => self.attach(&mut session, room, &url),
            Err(e) => tracing::error!("Cannot reconnect to room '{}': {}", room, e),
        }
    }

    fn transmit(session: &Session, frame: &OutboundFrame) -> Result<(), ClientError> {
        if session.state != ConnectionState::Open {
            return Err(ClientError::NotConnected);
        }
        let commands = session.commands.as_ref().ok_or(ClientError::NotConnected)?;
        let json = frame.to_json()?;
        commands
            .send(TransportCommand::Text(json))
            .map_err(|_| ClientError::NotConnected)
    }

    fn set_state(&self, session: &mut Session, state: ConnectionState) {
        if session.state != state {
            session.state = state;
            self.emit(ChatEvent::StateChanged(state));
        }
    }

    fn set_error(&self, session: &mut Session, message: String) {
        session.connection_error = Some(message.clone());
        self.emit(ChatEvent::ConnectionError(message));
    }

    fn emit(&self, event: ChatEvent) {
        // The receiver may be gone when the adapter stopped listening.
        let _ = self.inner.events.send(event);
    }
}
