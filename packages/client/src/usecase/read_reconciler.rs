//! UseCase: 既読コマンドの送信タイミング
//!
//! ## 概要
//!
//! `mark_read` を「いつ」送るかだけを決めます。既読状態の変更そのものは
//! サーバーからの `chat_read` エコーを受け取ったときに `MessageStore` が行います。
//!
//! 判定は入力データ（パネルの開閉、タブ、メッセージ数、接続状態）が
//! 変わったときだけ再評価されます。

use crate::connection::ConnectionState;

/// Tab of the customer widget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatTab {
    /// Live chat with staff
    #[default]
    LiveChat,
    /// Disconnected AI assistant
    Assistant,
}

/// Inputs that decide whether the attached room should be marked as read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTrigger {
    Customer {
        panel_open: bool,
        active_tab: ChatTab,
        message_count: usize,
        state: ConnectionState,
    },
    /// The staff console is a dedicated screen, so there is no panel to open.
    Staff {
        room_selected: bool,
        message_count: usize,
        state: ConnectionState,
    },
}

impl ReadTrigger {
    /// Whether a `mark_read` command is due for these inputs.
    pub fn is_satisfied(&self) -> bool {
        match *self {
            Self::Customer {
                panel_open,
                active_tab,
                message_count,
                state,
            } => {
                panel_open
                    && active_tab == ChatTab::LiveChat
                    && message_count > 0
                    && state == ConnectionState::Open
            }
            Self::Staff {
                room_selected,
                message_count,
                state,
            } => room_selected && message_count > 0 && state == ConnectionState::Open,
        }
    }
}

/// Remembers the last observed trigger so a `mark_read` is only emitted when
/// the inputs actually changed.
#[derive(Debug, Default)]
pub struct ReadReconciler {
    last: Option<ReadTrigger>,
}

impl ReadReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current inputs.
    ///
    /// # Returns
    ///
    /// `true` if one `mark_read` command should be emitted now
    pub fn observe(&mut self, trigger: ReadTrigger) -> bool {
        if self.last == Some(trigger) {
            return false;
        }
        self.last = Some(trigger);
        trigger.is_satisfied()
    }

    /// Forget the last inputs, e.g. after switching rooms.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
