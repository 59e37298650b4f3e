//! Session store: token issuance, sliding-window validation, destruction.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::config::Config;
use crate::models::session::{AuthSession, Session};
use crate::models::user::User;
use crate::utils::token::{create_session_token, generate_session_id, verify_session_token};

/// Creates a session row for the user and returns it together with the
/// bearer token that proves it.
pub async fn create_session(
    pool: &PgPool,
    config: &Config,
    user_id: &str,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) -> anyhow::Result<(Session, String)> {
    let session_id = generate_session_id();
    let token = create_session_token(
        user_id.to_string(),
        session_id.clone(),
        &config.jwt_secret,
        config.session_lifetime_seconds,
    )?;

    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, token, ip_address, user_agent, last_activity, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        RETURNING id, user_id, token, ip_address, user_agent, last_activity, created_at
        "#,
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(&token)
    .bind(ip_address)
    .bind(user_agent)
    .fetch_one(pool)
    .await?;

    Ok((session, token))
}

/// Resolves a bearer token to its live session and user.
///
/// Signature failure, embedded expiry, a missing row and an exceeded sliding
/// window all collapse to `Ok(None)`; the specific cause is only logged at
/// debug level. `Err` is reserved for store failures.
pub async fn validate_token(
    pool: &PgPool,
    config: &Config,
    token: &str,
) -> Result<Option<AuthSession>, sqlx::Error> {
    let claims = match verify_session_token(token, &config.jwt_secret) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "token signature/expiry check failed");
            return Ok(None);
        }
    };

    let lifetime = Duration::seconds(config.session_lifetime_seconds as i64);
    let cutoff = Utc::now() - lifetime;

    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, user_id, token, ip_address, user_agent, last_activity, created_at
        FROM sessions
        WHERE token = $1 AND last_activity > $2
        "#,
    )
    .bind(token)
    .bind(cutoff)
    .fetch_optional(pool)
    .await?;

    let Some(session) = session else {
        tracing::debug!(session_id = %claims.sid, "no live session row for token");
        return Ok(None);
    };

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, name, LOWER(role) AS role, phone, company, address, \
         city, state, country, created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(&session.user_id)
    .fetch_optional(pool)
    .await?;

    let Some(user) = user else {
        tracing::debug!(user_id = %session.user_id, "session points at a deleted user");
        return Ok(None);
    };

    // Sliding window: every validated access refreshes last_activity.
    touch_last_activity(pool, &session.id).await?;

    Ok(Some(AuthSession {
        session_id: session.id,
        user,
    }))
}

pub async fn touch_last_activity(pool: &PgPool, session_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE sessions SET last_activity = NOW() WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await
        .map(|_| ())
}

/// Deletes the session and its activity rows. Idempotent: destroying an
/// absent session is not an error; the returned bool tells the router whether
/// anything existed.
pub async fn destroy_session(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;

    sqlx::query("DELETE FROM user_activity WHERE session_id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes sessions whose sliding window lapsed. Run out-of-band.
pub async fn cleanup_expired_sessions(
    pool: &PgPool,
    lifetime_seconds: u64,
) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - Duration::seconds(lifetime_seconds as i64);
    let result = sqlx::query("DELETE FROM sessions WHERE last_activity <= $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
