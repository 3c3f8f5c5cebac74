//! Connection management for one chat room at a time.

mod event;
mod manager;
mod state;

pub use event::ChatEvent;
pub use manager::{ConnectionManager, TRANSPORT_ERROR_MESSAGE};
pub use state::ConnectionState;
