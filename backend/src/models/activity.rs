//! Heartbeat activity rows and connection-limit summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Liveness record for one (user, session) pair. Upserted on login, explicit
/// heartbeats, and every streaming-loop iteration; retained after going
/// inactive for audit and cleanup.
pub struct ActivityRecord {
    pub user_id: String,
    pub session_id: String,
    pub last_heartbeat: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// One entry of the active-session listing, most recent heartbeat first.
pub struct ActiveSessionSummary {
    pub session_id: String,
    pub last_heartbeat: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Admission-control verdict for a new streaming connection.
pub struct ConnectionLimit {
    pub can_connect: bool,
    pub current_connections: i64,
    pub max_connections: i64,
}
