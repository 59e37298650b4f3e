//! Session rows and the authenticated-session view used by request handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// One bearer-token session. Many sessions per user are allowed; liveness is
/// a sliding window over `last_activity`.
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
/// A validated token resolved to its session and owning user. Constructed
/// only by `repositories::session::validate_token`, so holding one proves the
/// session was live at lookup time.
pub struct AuthSession {
    pub session_id: String,
    pub user: User,
}

impl AuthSession {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload naming the session to destroy on logout.
pub struct LogoutRequest {
    pub session_id: String,
}
