//! Terminal loops of the two front-ends.

use std::sync::Arc;

use velochat_shared::time::SystemClock;

use crate::{
    config::ChatConfig,
    connection::{ChatEvent, ConnectionManager},
    domain::{AuthSnapshot, ConversationEntry, ViewerRole},
    error::ClientError,
    infrastructure::{
        room_directory::{HttpRoomDirectory, spawn_room_poller},
        transport::WebSocketConnector,
    },
};

use super::{
    console::StaffConsole,
    formatter::MessageFormatter,
    input::{Command, redisplay_prompt, spawn_input_reader},
    widget::CustomerWidget,
};

const CUSTOMER_PROMPT: &str = "you> ";
const STAFF_PROMPT: &str = "staff> ";

const CUSTOMER_HELP: &str = "\
/open, /close      show or hide the chat panel
/tab chat|ai       switch between live chat and the assistant
/quit              leave
anything else is sent on the active tab";

const STAFF_HELP: &str = "\
/rooms             show the room list
/room <n|id>       open a room by list position or id
/leave             close the open room
/quit              leave
anything else is sent to the open room";

/// Run the customer widget until the user quits
pub async fn run_customer_widget(config: ChatConfig, auth: AuthSnapshot) -> Result<(), ClientError> {
    let (manager, mut events) = ConnectionManager::new(
        Arc::new(WebSocketConnector::new()),
        config,
        ViewerRole::Customer,
    );
    let mut widget = CustomerWidget::new(manager, Arc::new(SystemClock));

    match widget.follow_auth(&auth).await {
        Ok(()) => {}
        Err(ClientError::NotAuthenticated) => {
            print!("{}", MessageFormatter::format_connection_error("Sign in to chat with staff"));
        }
        Err(e) => return Err(e),
    }
    println!("\n{}\n", CUSTOMER_HELP);

    let mut input = spawn_input_reader(CUSTOMER_PROMPT.to_string());

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                render_event(&event, ViewerRole::Customer, widget.is_panel_open());
                print_unread_badge(&event, widget.manager()).await;
                redisplay_prompt(CUSTOMER_PROMPT);
            }
            line = input.recv() => {
                let Some(line) = line else { break };
                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::OpenPanel => {
                        widget.open_panel();
                        print_transcript(&widget.entries().await, ViewerRole::Customer);
                    }
                    Command::ClosePanel => widget.close_panel(),
                    Command::SwitchTab(tab) => {
                        widget.switch_tab(tab);
                        print_transcript(&widget.entries().await, ViewerRole::Customer);
                    }
                    Command::Say(text) => {
                        if let Err(e) = widget.submit(&text).await {
                            print!("{}", MessageFormatter::format_connection_error(&e.to_string()));
                        } else if let Some(ConversationEntry::Assistant(entry)) =
                            widget.entries().await.last()
                        {
                            println!("{}", MessageFormatter::format_assistant_message(entry));
                        }
                    }
                    Command::Help => println!("{}", CUSTOMER_HELP),
                    other => println!("Unknown command: {:?}", other),
                }
            }
        }

        if let Err(e) = widget.sync_read_state().await {
            tracing::debug!("mark_read skipped: {}", e);
        }
    }

    widget.close().await;
    tracing::info!("Customer widget closed");
    Ok(())
}

/// Run the staff console until the user quits
pub async fn run_staff_console(config: ChatConfig) -> Result<(), ClientError> {
    let directory = Arc::new(HttpRoomDirectory::new(&config)?);
    let (rooms, poller) = spawn_room_poller(directory, config.room_poll_interval);
    let (manager, mut events) =
        ConnectionManager::new(Arc::new(WebSocketConnector::new()), config, ViewerRole::Staff);
    let mut console = StaffConsole::new(manager, rooms);

    println!("\n{}\n", STAFF_HELP);
    let mut input = spawn_input_reader(STAFF_PROMPT.to_string());

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                render_event(&event, ViewerRole::Staff, console.selected().is_some());
                print_unread_badge(&event, console.manager()).await;
                redisplay_prompt(STAFF_PROMPT);
            }
            changed = console.rooms_changed() => {
                if !changed {
                    tracing::warn!("Room poller stopped");
                    break;
                }
                if console.selected().is_none() {
                    print!("{}", MessageFormatter::format_room_list(&console.rooms(), None));
                    redisplay_prompt(STAFF_PROMPT);
                }
            }
            line = input.recv() => {
                let Some(line) = line else { break };
                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::ShowRooms => {
                        print!("{}", MessageFormatter::format_room_list(&console.rooms(), console.selected()));
                    }
                    Command::SelectRoom(target) => {
                        let room_id = match target.parse::<usize>() {
                            Ok(position) => console.room_at(position),
                            Err(_) => Some(target),
                        };
                        match room_id {
                            Some(room_id) => {
                                if let Err(e) = console.select_room(&room_id).await {
                                    print!("{}", MessageFormatter::format_connection_error(&e.to_string()));
                                }
                            }
                            None => println!("No such room"),
                        }
                    }
                    Command::LeaveRoom => console.leave_room().await,
                    Command::Say(text) => {
                        if let Err(e) = console.submit(&text).await {
                            print!("{}", MessageFormatter::format_connection_error(&e.to_string()));
                        }
                    }
                    Command::Help => println!("{}", STAFF_HELP),
                    other => println!("Unknown command: {:?}", other),
                }
            }
        }

        if let Err(e) = console.sync_read_state().await {
            tracing::debug!("mark_read skipped: {}", e);
        }
    }

    console.close().await;
    poller.abort();
    tracing::info!("Staff console closed");
    Ok(())
}

fn render_event(event: &ChatEvent, viewer: ViewerRole, visible: bool) {
    match event {
        ChatEvent::StateChanged(state) => print!("{}", MessageFormatter::format_state(*state)),
        ChatEvent::ConnectionError(message) => {
            print!("{}", MessageFormatter::format_connection_error(message))
        }
        ChatEvent::HistoryReplaced { count } if visible => {
            println!("\n({} messages loaded)", count);
        }
        ChatEvent::MessageAppended(message) if visible => {
            let entry = ConversationEntry::Chat(message.clone());
            println!("\n{}", MessageFormatter::format_entry(&entry, viewer));
        }
        ChatEvent::ReadApplied { reader, updated } => {
            tracing::debug!("{:?} read receipt updated {} messages", reader, updated);
        }
        _ => {}
    }
}

/// Show how many messages of the other side are still unread.
async fn print_unread_badge(event: &ChatEvent, manager: &ConnectionManager) {
    if !matches!(
        event,
        ChatEvent::MessageAppended(_) | ChatEvent::ReadApplied { .. } | ChatEvent::HistoryReplaced { .. }
    ) {
        return;
    }
    let summary = manager.read_summary().await;
    if let Some(badge) = MessageFormatter::format_unread(&summary, manager.viewer()) {
        println!("({})", badge);
    }
}

fn print_transcript(entries: &[ConversationEntry], viewer: ViewerRole) {
    print!("{}", MessageFormatter::format_transcript(entries, viewer));
}
