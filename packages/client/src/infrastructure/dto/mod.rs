//! Data Transfer Objects (DTOs) for the chat backend.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs
//! - `http`: REST response DTOs

pub mod http;
pub mod websocket;
