//! Terminal input: a rustyline thread feeding a tokio channel, and the
//! slash commands both front-ends understand.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::usecase::ChatTab;

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to submit on the active conversation
    Say(String),
    OpenPanel,
    ClosePanel,
    SwitchTab(ChatTab),
    /// Staff: open a room by 1-based list position or by room id
    SelectRoom(String),
    LeaveRoom,
    ShowRooms,
    Quit,
    Help,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("open", None) => Self::OpenPanel,
            ("close", None) => Self::ClosePanel,
            ("tab", Some("chat")) => Self::SwitchTab(ChatTab::LiveChat),
            ("tab", Some("ai")) => Self::SwitchTab(ChatTab::Assistant),
            ("room", Some(room)) => Self::SelectRoom(room.to_string()),
            ("leave", None) => Self::LeaveRoom,
            ("rooms", None) => Self::ShowRooms,
            ("quit" | "exit", None) => Self::Quit,
            ("help", None) => Self::Help,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// Redisplay the prompt after printing something above it
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

/// Read lines on a dedicated thread (rustyline is synchronous).
///
/// The channel closes on Ctrl+C, Ctrl+D or a readline failure.
pub fn spawn_input_reader(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
