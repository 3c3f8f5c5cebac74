//! Customer chat widget.
//!
//! A floating panel with two tabs: the live chat with staff and the
//! disconnected AI assistant. The live chat follows the customer's auth
//! session; the assistant transcript only lives in the widget.

use std::sync::Arc;

use velochat_shared::time::Clock;

use crate::{
    connection::ConnectionManager,
    domain::{AssistantMessage, AuthSnapshot, ConversationEntry},
    error::ClientError,
    usecase::{ChatTab, ReadReconciler, ReadTrigger, RoomMultiplexer},
};

pub struct CustomerWidget {
    multiplexer: RoomMultiplexer,
    clock: Arc<dyn Clock>,
    panel_open: bool,
    tab: ChatTab,
    assistant: Vec<AssistantMessage>,
    reconciler: ReadReconciler,
}

impl CustomerWidget {
    pub fn new(manager: ConnectionManager, clock: Arc<dyn Clock>) -> Self {
        Self {
            multiplexer: RoomMultiplexer::new(manager),
            clock,
            panel_open: false,
            tab: ChatTab::default(),
            assistant: Vec::new(),
            reconciler: ReadReconciler::new(),
        }
    }

    pub fn manager(&self) -> &ConnectionManager {
        self.multiplexer.manager()
    }

    /// Attach the live chat to the signed-in customer's room.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` while nobody is signed in.
    pub async fn follow_auth(&mut self, auth: &AuthSnapshot) -> Result<(), ClientError> {
        self.reconciler.reset();
        self.multiplexer.follow_auth(auth).await
    }

    pub fn open_panel(&mut self) {
        self.panel_open = true;
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn switch_tab(&mut self, tab: ChatTab) {
        self.tab = tab;
    }

    pub fn tab(&self) -> ChatTab {
        self.tab
    }

    pub fn assistant_transcript(&self) -> &[AssistantMessage] {
        &self.assistant
    }

    /// Submit what the customer typed on the active tab.
    ///
    /// The live-chat tab sends the text to staff. The assistant tab only
    /// records the customer's turn.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotConnected` when the live chat is down.
    pub async fn submit(&mut self, content: &str) -> Result<(), ClientError> {
        match self.tab {
            ChatTab::LiveChat => self.multiplexer.manager().send(content).await,
            ChatTab::Assistant => {
                self.record_assistant_turn(true, content);
                Ok(())
            }
        }
    }

    /// Record a reply produced by the assistant.
    pub fn push_assistant_reply(&mut self, content: &str) {
        self.record_assistant_turn(false, content);
    }

    /// Entries of the active tab, oldest first.
    pub async fn entries(&self) -> Vec<ConversationEntry> {
        match self.tab {
            ChatTab::LiveChat => self
                .multiplexer
                .manager()
                .messages()
                .await
                .into_iter()
                .map(ConversationEntry::Chat)
                .collect(),
            ChatTab::Assistant => self
                .assistant
                .iter()
                .cloned()
                .map(ConversationEntry::Assistant)
                .collect(),
        }
    }

    /// Emit `mark_read` if the widget's inputs changed and now call for it.
    ///
    /// # Returns
    ///
    /// `true` if a `mark_read` command was sent
    pub async fn sync_read_state(&mut self) -> Result<bool, ClientError> {
        let manager = self.multiplexer.manager();
        let trigger = ReadTrigger::Customer {
            panel_open: self.panel_open,
            active_tab: self.tab,
            message_count: manager.message_count().await,
            state: manager.state().await,
        };
        if !self.reconciler.observe(trigger) {
            return Ok(false);
        }
        manager.mark_read().await?;
        Ok(true)
    }

    /// Leave the room when the widget goes away.
    pub async fn close(&mut self) {
        self.multiplexer.release().await;
    }

    fn record_assistant_turn(&mut self, is_user: bool, content: &str) {
        self.assistant.push(AssistantMessage {
            is_user,
            content: content.to_string(),
            sent_at_millis: self.clock.now_millis(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;
    use velochat_shared::time::FixedClock;

    use super::*;
    use crate::{
        config::ChatConfig,
        connection::{ChatEvent, ConnectionState},
        domain::ViewerRole,
        infrastructure::transport::{TransportCommand, TransportEvent, testing::FakeConnector},
    };

    const NOW: i64 = 1714550400000;

    fn setup() -> (CustomerWidget, Arc<FakeConnector>, mpsc::UnboundedReceiver<ChatEvent>) {
        let connector = Arc::new(FakeConnector::default());
        let (manager, events) = ConnectionManager::new(
            connector.clone(),
            ChatConfig::new("https://shop.test"),
            ViewerRole::Customer,
        );
        let widget = CustomerWidget::new(manager, Arc::new(FixedClock::new(NOW)));
        (widget, connector, events)
    }

    async fn wait_for_history(events: &mut mpsc::UnboundedReceiver<ChatEvent>) {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
                .await
                .expect("timed out waiting for history")
                .expect("event channel closed");
            if matches!(event, ChatEvent::HistoryReplaced { .. }) {
                return;
            }
        }
    }

    /// Attach customer 42 and deliver a two-message history.
    async fn attach_with_history(
        widget: &mut CustomerWidget,
        connector: &FakeConnector,
        events: &mut mpsc::UnboundedReceiver<ChatEvent>,
    ) {
        widget
            .follow_auth(&AuthSnapshot::authenticated(42))
            .await
            .unwrap();
        connector.emit(0, TransportEvent::Opened);
        connector.emit_text(
            0,
            serde_json::json!({"type": "chat_history", "data": [
                {"id": 1, "room_id": "customer_42", "sender_type": "staff", "sender": "Aiko",
                 "content": "welcome", "timestamp": "2024-05-01T08:00:00Z"},
                {"id": 2, "room_id": "customer_42", "sender_type": "customer",
                 "sender": {"id": 42, "username": "ken"},
                 "content": "hi", "timestamp": "2024-05-01T08:01:00Z"}
            ]}),
        );
        wait_for_history(events).await;
        assert_eq!(widget.manager().state().await, ConnectionState::Open);
    }

    fn mark_read_frames(sent: &[TransportCommand]) -> usize {
        sent.iter()
            .filter(|command| matches!(command, TransportCommand::Text(text) if text.contains("mark_read")))
            .count()
    }

    #[tokio::test]
    async fn test_sync_read_state_waits_for_open_panel() {
        // テスト項目: パネルが閉じている間は既読にせず、開いたときに 1 回だけ既読にする
        // given (前提条件):
        let (mut widget, connector, mut events) = setup();
        attach_with_history(&mut widget, &connector, &mut events).await;

        // when (操作):
        let while_closed = widget.sync_read_state().await.unwrap();
        widget.open_panel();
        let opened = widget.sync_read_state().await.unwrap();
        let again = widget.sync_read_state().await.unwrap();

        // then (期待する結果):
        assert!(!while_closed);
        assert!(opened);
        assert!(!again);
        let sent = connector.sent(0);
        assert_eq!(mark_read_frames(&sent), 1);
        assert!(matches!(
            sent.as_slice(),
            [TransportCommand::Text(text)] if text == r#"{"type":"mark_read","is_staff_interface":false}"#
        ));
    }

    #[tokio::test]
    async fn test_assistant_tab_does_not_mark_read() {
        // テスト項目: AI タブを表示している間は既読にしない
        // given (前提条件):
        let (mut widget, connector, mut events) = setup();
        attach_with_history(&mut widget, &connector, &mut events).await;
        widget.open_panel();
        widget.switch_tab(ChatTab::Assistant);

        // when (操作):
        let marked = widget.sync_read_state().await.unwrap();

        // then (期待する結果):
        assert!(!marked);
        assert_eq!(mark_read_frames(&connector.sent(0)), 0);
    }

    #[tokio::test]
    async fn test_submit_on_assistant_tab_stays_local() {
        // テスト項目: AI タブでの送信はローカルの履歴に残り、ソケットには送られない
        // given (前提条件):
        let (mut widget, connector, mut events) = setup();
        attach_with_history(&mut widget, &connector, &mut events).await;
        widget.switch_tab(ChatTab::Assistant);

        // when (操作):
        widget.submit("which bike fits me?").await.unwrap();
        widget.push_assistant_reply("a gravel bike");

        // then (期待する結果):
        assert!(connector.sent(0).is_empty());
        let entries = widget.entries().await;
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_mine(ViewerRole::Customer));
        assert!(!entries[1].is_mine(ViewerRole::Customer));
        assert_eq!(widget.assistant_transcript()[0].sent_at_millis, NOW);
    }

    #[tokio::test]
    async fn test_submit_on_live_tab_sends_chat_message() {
        // テスト項目: ライブチャットタブでの送信はサーバーに送られる
        // given (前提条件):
        let (mut widget, connector, mut events) = setup();
        attach_with_history(&mut widget, &connector, &mut events).await;

        // when (操作):
        widget.submit("hello").await.unwrap();

        // then (期待する結果):
        assert!(matches!(
            connector.sent(0).as_slice(),
            [TransportCommand::Text(text)] if text == r#"{"type":"chat_message","content":"hello"}"#
        ));
        let entries = widget.entries().await;
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_mine(ViewerRole::Customer));
        assert!(entries[1].is_mine(ViewerRole::Customer));
    }

    #[tokio::test]
    async fn test_submit_while_signed_out_reports_not_connected() {
        // テスト項目: 未接続での送信はエラーになりバナーが表示される
        // given (前提条件):
        let (mut widget, connector, _events) = setup();
        let _ = widget.follow_auth(&AuthSnapshot::anonymous()).await;

        // when (操作):
        let result = widget.submit("hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::NotConnected)));
        assert_eq!(connector.open_count(), 0);
        assert_eq!(
            widget.manager().connection_error().await.as_deref(),
            Some("Not connected to chat server")
        );
    }
}
