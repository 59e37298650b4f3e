use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tower::ServiceExt;

use akani_backend::{config::Config, handlers, middleware as app_middleware, models::user::UserRole};

mod support;

use support::{seed_session, seed_user, test_config, test_pool};

async fn integration_guard() -> tokio::sync::MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD.get_or_init(|| Mutex::new(())).lock().await
}

fn activity_router(pool: PgPool, config: Config) -> Router {
    Router::new()
        .route(
            "/api/activity/heartbeat",
            post(handlers::activity::heartbeat),
        )
        .route(
            "/api/activity/sessions",
            get(handlers::activity::list_sessions),
        )
        .route("/api/activity/check", get(handlers::activity::check))
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            app_middleware::auth,
        ))
        .with_state((pool, config))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse body")
}

fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn heartbeat_then_check_and_list() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();

    let user = seed_user(&pool, UserRole::User).await;
    let (session, token) = seed_session(&pool, &config, &user.id).await;
    let app = activity_router(pool.clone(), config.clone());

    // Before any heartbeat the session is not active.
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/activity/check", &token))
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["is_active"], false);

    let response = app
        .clone()
        .oneshot(authed_request("POST", "/api/activity/heartbeat", &token))
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/activity/check", &token))
        .await
        .expect("send request");
    let json = body_json(response).await;
    assert_eq!(json["is_active"], true);

    let response = app
        .oneshot(authed_request("GET", "/api/activity/sessions", &token))
        .await
        .expect("send request");
    let json = body_json(response).await;
    let sessions = json["sessions"].as_array().expect("sessions array");
    assert!(sessions
        .iter()
        .any(|s| s["session_id"] == session.id.as_str()));
}

#[tokio::test]
async fn activity_endpoints_require_auth() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    let config = test_config();
    let app = activity_router(pool, config);

    for (method, uri) in [
        ("POST", "/api/activity/heartbeat"),
        ("GET", "/api/activity/sessions"),
        ("GET", "/api/activity/check"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
