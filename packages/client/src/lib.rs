//! Real-time chat transport for the velochat storefront.
//!
//! This library provides the client side of the storefront's support chat:
//! a reconnecting WebSocket session per room, a deduplicating message store,
//! read-receipt reconciliation and the room multiplexer that points the
//! session at the right conversation for a customer or a staff operator.

// layers
pub mod connection;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared pieces
pub mod config;
pub mod error;
pub mod store;

pub use config::ChatConfig;
pub use connection::{ChatEvent, ConnectionManager, ConnectionState};
pub use error::ClientError;
