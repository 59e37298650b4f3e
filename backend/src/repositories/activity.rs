//! Activity tracker: heartbeats, liveness checks, connection-limit counting.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::config::Config;
use crate::models::activity::{ActiveSessionSummary, ConnectionLimit};

pub async fn register_heartbeat(
    pool: &PgPool,
    user_id: &str,
    session_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_activity (user_id, session_id, last_heartbeat, is_active)
        VALUES ($1, $2, NOW(), TRUE)
        ON CONFLICT (user_id, session_id)
        DO UPDATE SET last_heartbeat = NOW(), is_active = TRUE
        "#,
    )
    .bind(user_id)
    .bind(session_id)
    .execute(pool)
    .await
    .map(|_| ())
}

/// True iff the record exists, is flagged active, and heartbeated within the
/// inactivity window.
pub async fn is_active(
    pool: &PgPool,
    config: &Config,
    user_id: &str,
    session_id: &str,
) -> Result<bool, sqlx::Error> {
    let cutoff = heartbeat_cutoff(config);
    let row: Option<(bool,)> = sqlx::query_as(
        r#"
        SELECT is_active FROM user_activity
        WHERE user_id = $1 AND session_id = $2 AND last_heartbeat > $3
        "#,
    )
    .bind(user_id)
    .bind(session_id)
    .bind(cutoff)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(active,)| active).unwrap_or(false))
}

/// Flags the pair inactive. The row is kept for audit and later cleanup.
pub async fn mark_inactive(
    pool: &PgPool,
    user_id: &str,
    session_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_activity SET is_active = FALSE WHERE user_id = $1 AND session_id = $2")
        .bind(user_id)
        .bind(session_id)
        .execute(pool)
        .await
        .map(|_| ())
}

/// All of the user's sessions that are active within the window, most recent
/// heartbeat first.
pub async fn list_active_sessions(
    pool: &PgPool,
    config: &Config,
    user_id: &str,
) -> Result<Vec<ActiveSessionSummary>, sqlx::Error> {
    let cutoff = heartbeat_cutoff(config);
    sqlx::query_as::<_, ActiveSessionSummary>(
        r#"
        SELECT session_id, last_heartbeat
        FROM user_activity
        WHERE user_id = $1 AND is_active = TRUE AND last_heartbeat > $2
        ORDER BY last_heartbeat DESC
        "#,
    )
    .bind(user_id)
    .bind(cutoff)
    .fetch_all(pool)
    .await
}

/// Admission-control gate for new streaming connections. Admitted while the
/// active-session count is strictly below the configured cap.
pub async fn check_connection_limit(
    pool: &PgPool,
    config: &Config,
    user_id: &str,
) -> Result<ConnectionLimit, sqlx::Error> {
    let active = list_active_sessions(pool, config, user_id).await?;
    let current = active.len() as i64;

    Ok(ConnectionLimit {
        can_connect: current < config.max_connections_per_user,
        current_connections: current,
        max_connections: config.max_connections_per_user,
    })
}

/// Deletes inactive rows whose last heartbeat is older than the retention
/// window.
pub async fn cleanup_inactive(pool: &PgPool, hours_old: i64) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - Duration::hours(hours_old);
    let result =
        sqlx::query("DELETE FROM user_activity WHERE is_active = FALSE AND last_heartbeat < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

fn heartbeat_cutoff(config: &Config) -> chrono::DateTime<Utc> {
    Utc::now() - Duration::seconds(config.inactivity_timeout_seconds as i64)
}
