use akani_backend::{models::user::UserRole, repositories::session as session_repo};
use std::sync::OnceLock;
use tokio::sync::Mutex;

mod support;

use support::{seed_user, test_config, test_pool};

async fn integration_guard() -> tokio::sync::MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD.get_or_init(|| Mutex::new(())).lock().await
}

#[tokio::test]
async fn create_and_validate_session_roundtrip() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();

    let user = seed_user(&pool, UserRole::User).await;
    let (session, token) =
        session_repo::create_session(&pool, &config, &user.id, Some("127.0.0.1"), Some("tests"))
            .await
            .expect("create session");

    assert_eq!(session.user_id, user.id);
    assert_eq!(session.id.len(), 64);
    assert_eq!(session.ip_address.as_deref(), Some("127.0.0.1"));

    let auth = session_repo::validate_token(&pool, &config, &token)
        .await
        .expect("validate token")
        .expect("token resolves to a session");

    assert_eq!(auth.session_id, session.id);
    assert_eq!(auth.user.id, user.id);
}

#[tokio::test]
async fn validate_token_rejects_garbage_and_wrong_secret() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();

    let result = session_repo::validate_token(&pool, &config, "not-a-jwt")
        .await
        .expect("validate should not error on a bad token");
    assert!(result.is_none());

    let user = seed_user(&pool, UserRole::User).await;
    let (_, token) = session_repo::create_session(&pool, &config, &user.id, None, None)
        .await
        .expect("create session");

    let mut other_config = test_config();
    other_config.jwt_secret = "a_completely_different_secret_456789".into();
    let result = session_repo::validate_token(&pool, &other_config, &token)
        .await
        .expect("validate should not error on a foreign token");
    assert!(result.is_none());
}

#[tokio::test]
async fn validate_token_enforces_sliding_window() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();

    let user = seed_user(&pool, UserRole::User).await;
    let (session, token) = session_repo::create_session(&pool, &config, &user.id, None, None)
        .await
        .expect("create session");

    // Age the session past the lifetime window.
    sqlx::query("UPDATE sessions SET last_activity = NOW() - INTERVAL '2 hours' WHERE id = $1")
        .bind(&session.id)
        .execute(&pool)
        .await
        .expect("age session");

    let result = session_repo::validate_token(&pool, &config, &token)
        .await
        .expect("validate");
    assert!(result.is_none());
}

#[tokio::test]
async fn validate_token_refreshes_last_activity() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();

    let user = seed_user(&pool, UserRole::User).await;
    let (session, token) = session_repo::create_session(&pool, &config, &user.id, None, None)
        .await
        .expect("create session");

    sqlx::query("UPDATE sessions SET last_activity = NOW() - INTERVAL '30 minutes' WHERE id = $1")
        .bind(&session.id)
        .execute(&pool)
        .await
        .expect("age session within window");

    session_repo::validate_token(&pool, &config, &token)
        .await
        .expect("validate")
        .expect("still live");

    let (last_activity,): (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT last_activity FROM sessions WHERE id = $1")
            .bind(&session.id)
            .fetch_one(&pool)
            .await
            .expect("read last_activity");

    assert!(chrono::Utc::now() - last_activity < chrono::Duration::seconds(10));
}

#[tokio::test]
async fn destroy_session_is_idempotent_and_clears_activity() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();

    let user = seed_user(&pool, UserRole::User).await;
    let (session, _) = session_repo::create_session(&pool, &config, &user.id, None, None)
        .await
        .expect("create session");

    akani_backend::repositories::activity::register_heartbeat(&pool, &user.id, &session.id)
        .await
        .expect("register heartbeat");

    let existed = session_repo::destroy_session(&pool, &session.id)
        .await
        .expect("destroy session");
    assert!(existed);

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM user_activity WHERE session_id = $1")
            .bind(&session.id)
            .fetch_one(&pool)
            .await
            .expect("count activity rows");
    assert_eq!(count, 0);

    let existed = session_repo::destroy_session(&pool, &session.id)
        .await
        .expect("destroy absent session");
    assert!(!existed);
}

#[tokio::test]
async fn cleanup_deletes_only_lapsed_sessions() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();

    let user = seed_user(&pool, UserRole::User).await;
    let (stale, _) = session_repo::create_session(&pool, &config, &user.id, None, None)
        .await
        .expect("create stale session");
    let (live, _) = session_repo::create_session(&pool, &config, &user.id, None, None)
        .await
        .expect("create live session");

    sqlx::query("UPDATE sessions SET last_activity = NOW() - INTERVAL '2 hours' WHERE id = $1")
        .bind(&stale.id)
        .execute(&pool)
        .await
        .expect("age stale session");

    let deleted = session_repo::cleanup_expired_sessions(&pool, config.session_lifetime_seconds)
        .await
        .expect("cleanup");
    assert!(deleted >= 1);

    let (stale_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE id = $1")
        .bind(&stale.id)
        .fetch_one(&pool)
        .await
        .expect("count stale");
    assert_eq!(stale_count, 0);

    let (live_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE id = $1")
        .bind(&live.id)
        .fetch_one(&pool)
        .await
        .expect("count live");
    assert_eq!(live_count, 1);
}
