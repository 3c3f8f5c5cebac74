//! Domain model of the chat transport.
//!
//! Pure types and functions without I/O: messages and their senders, room
//! identifiers, viewer/reader roles and the derived read state.

pub mod message;
pub mod read_state;
pub mod room;

pub use message::{
    AssistantMessage, ChatMessage, ConversationEntry, MessageId, SenderIdentity, SenderRole,
    UserRef,
};
pub use read_state::{ReadSummary, ReaderRole, ViewerRole};
pub use room::{AuthSnapshot, RoomId, UNAUTHENTICATED_ROOM, customer_room_key};
