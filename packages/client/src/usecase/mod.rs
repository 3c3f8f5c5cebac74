//! Use cases layered on top of the connection manager.
//!
//! - `read_reconciler`: decides when a `mark_read` command is due
//! - `room_multiplexer`: points the connection manager at the viewer's room

pub mod read_reconciler;
pub mod room_multiplexer;

pub use read_reconciler::{ChatTab, ReadReconciler, ReadTrigger};
pub use room_multiplexer::RoomMultiplexer;
