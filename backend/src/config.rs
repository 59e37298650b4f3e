use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Sliding session window; also used as the embedded token expiry.
    pub session_lifetime_seconds: u64,
    /// Poll/sleep interval of the streaming loop.
    pub heartbeat_interval_seconds: u64,
    /// How long a connection may go without a successful heartbeat.
    pub inactivity_timeout_seconds: u64,
    pub max_connections_per_user: i64,
    pub event_retention_days: i64,
    pub activity_retention_hours: i64,
    /// Allowed CORS origins; a single "*" entry means any origin.
    pub cors_allow_origins: Vec<String>,
    pub bind_addr: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/akani".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        let session_lifetime_seconds = env_u64("SESSION_LIFETIME_SECONDS", 3600);
        let heartbeat_interval_seconds = env_u64("SSE_HEARTBEAT_INTERVAL_SECONDS", 30);
        let inactivity_timeout_seconds = env_u64("SSE_INACTIVITY_TIMEOUT_SECONDS", 120);
        let max_connections_per_user = env_u64("SSE_MAX_CONNECTIONS_PER_USER", 5) as i64;
        let event_retention_days = env_u64("SSE_EVENT_RETENTION_DAYS", 7) as i64;
        let activity_retention_hours = env_u64("ACTIVITY_RETENTION_HOURS", 24) as i64;

        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Config {
            database_url,
            jwt_secret,
            session_lifetime_seconds,
            heartbeat_interval_seconds,
            inactivity_timeout_seconds,
            max_connections_per_user,
            event_retention_days,
            activity_retention_hours,
            cors_allow_origins,
            bind_addr,
        })
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_seconds)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
