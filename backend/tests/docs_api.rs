use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tower::ServiceExt;
use utoipa::OpenApi;

use akani_backend::docs;

fn openapi_router() -> Router {
    Router::new().route(
        "/api-doc/openapi.json",
        get(|| async { Json(docs::ApiDoc::openapi()) }),
    )
}

#[test]
fn openapi_includes_core_paths_and_bearer_scheme() {
    let openapi = docs::ApiDoc::openapi();
    let json = serde_json::to_value(&openapi).expect("serialize openapi");

    let paths = json
        .get("paths")
        .and_then(|v| v.as_object())
        .expect("paths object");
    for path in [
        "/api/auth/login",
        "/api/auth/logout",
        "/api/users",
        "/api/users/{id}",
        "/api/users/email/{email}",
        "/api/events",
        "/api/events/stream",
        "/api/activity/heartbeat",
        "/api/activity/sessions",
        "/api/activity/check",
    ] {
        assert!(paths.contains_key(path), "missing path {}", path);
    }

    let bearer = json
        .pointer("/components/securitySchemes/BearerAuth")
        .expect("BearerAuth scheme");
    assert_eq!(bearer.get("type").and_then(Value::as_str), Some("http"));
    assert_eq!(bearer.get("scheme").and_then(Value::as_str), Some("bearer"));
}

#[test]
fn openapi_includes_request_and_response_schemas() {
    let openapi = docs::ApiDoc::openapi();
    let json = serde_json::to_value(&openapi).expect("serialize openapi");

    let schemas = json
        .pointer("/components/schemas")
        .and_then(|v| v.as_object())
        .expect("schemas object");
    for schema in [
        "LoginRequest",
        "LoginResponse",
        "LogoutRequest",
        "CreateUser",
        "UpdateUser",
        "UserResponse",
        "EnqueueRequest",
        "EnqueueResponse",
        "ActiveSessionSummary",
        "ConnectionLimit",
    ] {
        assert!(schemas.contains_key(schema), "missing schema {}", schema);
    }

    // The public user representation must not document the password hash.
    let user_properties = json
        .pointer("/components/schemas/UserResponse/properties")
        .and_then(|v| v.as_object())
        .expect("UserResponse properties");
    assert!(!user_properties.contains_key("password_hash"));
}

#[tokio::test]
async fn openapi_json_route_serves_spec() {
    let app = openapi_router();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-doc/openapi.json")
                .body(Body::empty())
                .expect("build openapi request"),
        )
        .await
        .expect("call openapi route");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("parse openapi json");

    let paths = json
        .get("paths")
        .and_then(|v| v.as_object())
        .expect("paths object");
    assert!(paths.contains_key("/api/events/stream"));
}
