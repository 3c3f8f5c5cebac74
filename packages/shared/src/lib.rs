//! Shared utilities for the velochat binaries.

pub mod logger;
pub mod time;
