//! Infrastructure: wire DTOs, the socket transport and the REST room directory.

pub mod dto;
pub mod room_directory;
pub mod transport;
