//! Durable event queue: enqueue, atomic drain, retention cleanup.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::models::event::{Event, TargetType};

const EVENT_COLUMNS: &str = "id, event_type, target_type, target_id, data, delivered, created_at";

/// Inserts one undelivered event. `TargetType::All` requires `target_id` to
/// be `None`; `Session`/`User` require it to be set. The database CHECK
/// enforces the same rule as a backstop.
pub async fn enqueue(
    pool: &PgPool,
    event_type: &str,
    target_type: TargetType,
    target_id: Option<&str>,
    data: &serde_json::Value,
) -> anyhow::Result<Event> {
    match (target_type, target_id) {
        (TargetType::All, Some(_)) => {
            anyhow::bail!("broadcast events must not carry a target id")
        }
        (TargetType::Session, None) | (TargetType::User, None) => {
            anyhow::bail!("{} events require a target id", target_type.as_str())
        }
        _ => {}
    }

    let event = sqlx::query_as::<_, Event>(&format!(
        "INSERT INTO sse_events (event_type, target_type, target_id, data) \
         VALUES ($1, $2, $3, $4) RETURNING {EVENT_COLUMNS}"
    ))
    .bind(event_type)
    .bind(target_type.as_str())
    .bind(target_id)
    .bind(data.to_string())
    .fetch_one(pool)
    .await?;

    Ok(event)
}

/// Fetch-and-mark-delivered for everything addressed to this session, this
/// user, or everyone.
///
/// A single `UPDATE ... WHERE delivered = FALSE ... RETURNING` flips each row
/// at most once, so two handlers racing on overlapping scopes (two sessions
/// of one user, or any two streams for a broadcast) can never both deliver
/// the same event. Delivery is single-shot per target, not per connection.
///
/// Rows come back ordered session-scoped first, then user-scoped, then
/// broadcast, each class ascending by creation time.
pub async fn drain(
    pool: &PgPool,
    user_id: &str,
    session_id: &str,
) -> Result<Vec<Event>, sqlx::Error> {
    let mut events = sqlx::query_as::<_, Event>(&format!(
        "UPDATE sse_events SET delivered = TRUE \
         WHERE delivered = FALSE \
           AND ((target_type = 'session' AND target_id = $1) \
             OR (target_type = 'user' AND target_id = $2) \
             OR target_type = 'all') \
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(session_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    events.sort_by(|a, b| {
        a.target_type
            .flush_rank()
            .cmp(&b.target_type.flush_rank())
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    Ok(events)
}

/// Deletes delivered events older than the retention window. Not
/// latency-sensitive; runs from the cleanup binary.
pub async fn cleanup_delivered_before(
    pool: &PgPool,
    retention_days: i64,
) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - Duration::days(retention_days);
    let result = sqlx::query("DELETE FROM sse_events WHERE delivered = TRUE AND created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
