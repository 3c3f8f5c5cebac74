//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Convert Unix timestamp (milliseconds) to an RFC 3339 string in UTC.
///
/// Out-of-range timestamps fall back to the Unix epoch.
pub fn millis_to_rfc3339(timestamp_millis: i64) -> String {
    millis_to_utc(timestamp_millis).to_rfc3339()
}

/// Render a timestamp as a short `HH:MM` label in the local time zone.
pub fn short_local_time(timestamp: DateTime<Utc>) -> String {
    Local
        .from_utc_datetime(&timestamp.naive_utc())
        .format("%H:%M")
        .to_string()
}

fn millis_to_utc(timestamp_millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp_millis).unwrap_or(DateTime::UNIX_EPOCH)
}
