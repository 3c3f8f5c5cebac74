//! REST response DTOs.

use serde::{Deserialize, Serialize};

/// One entry of the staff room listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_avatar: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub is_online: bool,
}
