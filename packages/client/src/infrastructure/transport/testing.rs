//! In-memory connector for unit tests.

use std::sync::Mutex;

use tokio::sync::mpsc;

use super::{Connector, TransportCommand, TransportEvent, TransportHandle};

/// Connector that records every transport it opens
#[derive(Default)]
pub(crate) struct FakeConnector {
    sockets: Mutex<Vec<FakeSocket>>,
}

struct FakeSocket {
    url: String,
    events: mpsc::UnboundedSender<TransportEvent>,
    commands: mpsc::UnboundedReceiver<TransportCommand>,
}

impl Connector for FakeConnector {
    fn open(&self, url: &str) -> TransportHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.sockets.lock().unwrap().push(FakeSocket {
            url: url.to_string(),
            events: event_tx,
            commands: command_rx,
        });
        TransportHandle {
            commands: command_tx,
            events: event_rx,
        }
    }
}

impl FakeConnector {
    pub(crate) fn open_count(&self) -> usize {
        self.sockets.lock().unwrap().len()
    }

    pub(crate) fn url(&self, index: usize) -> String {
        self.sockets.lock().unwrap()[index].url.clone()
    }

    /// Push an event as if the socket at `index` produced it.
    pub(crate) fn emit(&self, index: usize, event: TransportEvent) {
        self.sockets.lock().unwrap()[index]
            .events
            .send(event)
            .unwrap();
    }

    pub(crate) fn emit_text(&self, index: usize, json: serde_json::Value) {
        self.emit(index, TransportEvent::Text(json.to_string()));
    }

    /// Drain what the owner wrote to the socket at `index`.
    pub(crate) fn sent(&self, index: usize) -> Vec<TransportCommand> {
        let mut sockets = self.sockets.lock().unwrap();
        let mut sent = Vec::new();
        while let Ok(command) = sockets[index].commands.try_recv() {
            sent.push(command);
        }
        sent
    }
}
