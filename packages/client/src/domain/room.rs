//! Room identifiers and customer room resolution.

use std::fmt;

use crate::error::ClientError;

/// Room key meaning "no authenticated participant yet".
///
/// It is produced by `customer_room_key` and never sent over the wire.
pub const UNAUTHENTICATED_ROOM: &str = "invalid";

const CUSTOMER_ROOM_PREFIX: &str = "customer_";

/// A validated chat room identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Validate a room key.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` for the empty key and for the
    /// unauthenticated sentinel.
    pub fn parse(key: &str) -> Result<Self, ClientError> {
        let key = key.trim();
        if key.is_empty() || key == UNAUTHENTICATED_ROOM {
            return Err(ClientError::NotAuthenticated);
        }
        Ok(Self(key.to_string()))
    }

    /// Canonical room of a customer.
    pub fn for_customer(user_id: i64) -> Self {
        Self(format!("{CUSTOMER_ROOM_PREFIX}{user_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the external auth session exposes to the chat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub is_authenticated: bool,
    pub user_id: Option<i64>,
}

impl AuthSnapshot {
    pub fn authenticated(user_id: i64) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Room key for the customer widget, or the sentinel when signed out.
pub fn customer_room_key(auth: &AuthSnapshot) -> String {
    match (auth.is_authenticated, auth.user_id) {
        (true, Some(user_id)) => RoomId::for_customer(user_id).0,
        _ => UNAUTHENTICATED_ROOM.to_string(),
    }
}
