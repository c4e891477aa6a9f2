use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::menu::MenuType;
use crate::user::UserId;

/// Event name recorded for every menu transition.
pub const EVENT_MENU_TRANSITION: &str = "menu_transition";

/// Event name recorded when a user explicitly starts over.
pub const EVENT_SESSION_RESET: &str = "session_reset";

/// One row of the durable activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub event_name: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(user_id: UserId, event_name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            event_name: event_name.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}

/// Audit payload for a menu transition.
pub fn transition_payload(user_id: &UserId, from: MenuType, to: MenuType) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "from": from,
        "to": to,
    })
}
