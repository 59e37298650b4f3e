//! Queued SSE events and their addressing scopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
/// Addressing class of a queued event.
pub enum TargetType {
    /// One specific session.
    Session,
    /// Every session of one user.
    User,
    /// Every open stream (broadcast).
    All,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Session => "session",
            TargetType::User => "user",
            TargetType::All => "all",
        }
    }

    /// Flush order within one drain: session events first, then user, then
    /// broadcast. A class ordering, not a global timestamp merge.
    pub fn flush_rank(&self) -> u8 {
        match self {
            TargetType::Session => 0,
            TargetType::User => 1,
            TargetType::All => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// One row of the durable event queue. `data` is opaque text the queue never
/// interprets; `delivered` flips FALSE to TRUE exactly once.
pub struct Event {
    pub id: i64,
    pub event_type: String,
    pub target_type: TargetType,
    pub target_id: Option<String>,
    pub data: String,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Decodes the stored payload for wire delivery. Undecodable or empty
    /// payloads degrade to a fallback object instead of being dropped, so the
    /// client always receives one framed event per queued row.
    pub fn payload(&self) -> Value {
        if self.data.is_empty() {
            return serde_json::json!({ "message": "event carried no data" });
        }
        match serde_json::from_str::<Value>(&self.data) {
            Ok(value) if value.is_object() || value.is_array() => value,
            Ok(value) => serde_json::json!({ "data": value }),
            Err(err) => {
                tracing::warn!(
                    event_id = self.id,
                    error = %err,
                    "undecodable event payload, delivering fallback"
                );
                serde_json::json!({
                    "raw_data": self.data,
                    "error": "invalid event payload",
                })
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
/// Producer payload for enqueueing one event.
pub struct EnqueueRequest {
    #[validate(length(min = 1))]
    pub event_type: String,
    pub target_type: TargetType,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Fire-and-forget producer outcome. `success: false` never carries an HTTP
/// error status beyond validation failures.
pub struct EnqueueResponse {
    pub success: bool,
    pub message: String,
}
