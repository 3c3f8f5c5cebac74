//! In-memory message store for the active room.
//!
//! Holds the ordered message log and the dedup index keyed by message id.
//! Order is the order of receipt: the history batch first, then live
//! messages appended. Nothing here sorts by timestamp.

use std::collections::HashSet;

use crate::domain::{ChatMessage, MessageId, ReadSummary, ReaderRole};

/// Ordered, deduplicated message log of one room
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
    seen: HashSet<MessageId>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole log with a history batch.
    ///
    /// The dedup index is reset to exactly the ids in the batch. A repeated
    /// id inside the batch keeps its first occurrence.
    pub fn ingest_history(&mut self, batch: Vec<ChatMessage>) {
        self.messages.clear();
        self.seen.clear();
        for message in batch {
            if self.seen.insert(message.id) {
                self.messages.push(message);
            }
        }
    }

    /// Append a live message unless its id was already seen.
    ///
    /// # Returns
    ///
    /// `true` if the message was appended, `false` if it was a duplicate
    pub fn ingest_live(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Mark as read every message authored by the role the reader reads.
    ///
    /// # Returns
    ///
    /// The number of messages that flipped from unread to read
    pub fn apply_read_transition(&mut self, reader: ReaderRole) -> usize {
        let target = reader.read_target();
        let mut flipped = 0;
        for message in self
            .messages
            .iter_mut()
            .filter(|m| m.sender_role == target && !m.is_read)
        {
            message.is_read = true;
            flipped += 1;
        }
        flipped
    }

    /// Empty the log and the dedup index.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.seen.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.seen.contains(&id)
    }

    pub fn read_summary(&self) -> ReadSummary {
        ReadSummary::scan(&self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SenderRole;

    fn message(id: MessageId, role: SenderRole) -> ChatMessage {
        ChatMessage {
            id,
            room_id: "customer_42".to_string(),
            sender_role: role,
            sender_identity: None,
            content: format!("message {id}"),
            timestamp: chrono::DateTime::UNIX_EPOCH,
            formatted_timestamp: String::new(),
            is_read: false,
        }
    }

    fn ids(store: &MessageStore) -> Vec<MessageId> {
        store.messages().iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_ingest_live_is_idempotent_per_id() {
        // テスト項目: 既に存在する ID のメッセージを再受信してもストアは変わらない
        // given (前提条件):
        let mut store = MessageStore::new();
        store.ingest_history(vec![message(1, SenderRole::Customer)]);
        assert!(store.ingest_live(message(2, SenderRole::Staff)));
        let before = store.messages().to_vec();

        // when (操作):
        let appended_again = store.ingest_live(message(2, SenderRole::Staff));
        let history_id_again = store.ingest_live(message(1, SenderRole::Customer));

        // then (期待する結果):
        assert!(!appended_again);
        assert!(!history_id_again);
        assert_eq!(store.messages(), before.as_slice());
    }

    #[test]
    fn test_history_replaces_and_live_appends() {
        // テスト項目: 履歴は置き換え、ライブメッセージは末尾に追加される
        // given (前提条件):
        let mut store = MessageStore::new();
        store.ingest_history(vec![
            message(1, SenderRole::Customer),
            message(2, SenderRole::Staff),
        ]);
        store.ingest_live(message(3, SenderRole::Customer));
        assert_eq!(ids(&store), vec![1, 2, 3]);

        // when (操作): 再接続時の再同期
        store.ingest_history(vec![
            message(1, SenderRole::Customer),
            message(2, SenderRole::Staff),
        ]);

        // then (期待する結果):
        assert_eq!(ids(&store), vec![1, 2]);
        assert!(!store.contains(3));
        assert!(store.ingest_live(message(3, SenderRole::Customer)));
    }

    #[test]
    fn test_history_keeps_server_order_and_first_duplicate() {
        // テスト項目: 履歴はサーバーの順序を保ち、バッチ内の重複は最初のものを残す
        // given (前提条件):
        let mut store = MessageStore::new();
        let mut duplicate = message(5, SenderRole::Staff);
        duplicate.content = "second copy".to_string();

        // when (操作):
        store.ingest_history(vec![
            message(9, SenderRole::Customer),
            message(5, SenderRole::Staff),
            duplicate,
            message(7, SenderRole::System),
        ]);

        // then (期待する結果):
        assert_eq!(ids(&store), vec![9, 5, 7]);
        assert_eq!(store.messages()[1].content, "message 5");
    }

    #[test]
    fn test_read_transition_only_flips_complementary_role() {
        // テスト項目: 既読遷移は相手側ロールのメッセージだけを既読にする
        // given (前提条件):
        let mut store = MessageStore::new();
        store.ingest_history(vec![
            message(1, SenderRole::Customer),
            message(2, SenderRole::Staff),
            message(3, SenderRole::System),
        ]);

        // when (操作):
        let flipped = store.apply_read_transition(ReaderRole::Staff);

        // then (期待する結果):
        assert_eq!(flipped, 1);
        let read: Vec<(SenderRole, bool)> = store
            .messages()
            .iter()
            .map(|m| (m.sender_role, m.is_read))
            .collect();
        assert_eq!(
            read,
            vec![
                (SenderRole::Customer, true),
                (SenderRole::Staff, false),
                (SenderRole::System, false),
            ]
        );
    }

    #[test]
    fn test_read_transition_never_touches_system_messages() {
        // テスト項目: どちらの既読でもシステムメッセージは変更されない
        // given (前提条件):
        let mut store = MessageStore::new();
        store.ingest_history(vec![
            message(1, SenderRole::System),
            message(2, SenderRole::Staff),
        ]);

        // when (操作):
        store.apply_read_transition(ReaderRole::Customer);
        store.apply_read_transition(ReaderRole::Staff);

        // then (期待する結果):
        assert!(!store.messages()[0].is_read);
        assert!(store.messages()[1].is_read);
        assert_eq!(store.apply_read_transition(ReaderRole::Customer), 0);
    }

    #[test]
    fn test_reset_clears_messages_and_index() {
        // テスト項目: リセットでメッセージと重複排除インデックスが空になる
        // given (前提条件):
        let mut store = MessageStore::new();
        store.ingest_history(vec![message(1, SenderRole::Customer)]);

        // when (操作):
        store.reset();

        // then (期待する結果):
        assert!(store.is_empty());
        assert!(!store.contains(1));
        assert!(store.ingest_live(message(1, SenderRole::Customer)));
    }
}
