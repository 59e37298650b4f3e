#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::events::StreamQuery,
    models::{
        activity::{ActiveSessionSummary, ConnectionLimit},
        event::{EnqueueRequest, EnqueueResponse},
        session::LogoutRequest,
        user::{CreateUser, LoginRequest, LoginResponse, UpdateUser, UserResponse},
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        login_doc,
        logout_doc,
        list_users_doc,
        get_user_doc,
        get_user_by_email_doc,
        create_user_doc,
        update_user_doc,
        delete_user_doc,
        enqueue_event_doc,
        stream_doc,
        heartbeat_doc,
        active_sessions_doc,
        activity_check_doc
    ),
    components(
        schemas(
            // auth
            LoginRequest,
            LoginResponse,
            LogoutRequest,
            // users
            CreateUser,
            UpdateUser,
            UserResponse,
            // events
            EnqueueRequest,
            EnqueueResponse,
            // activity
            ActiveSessionSummary,
            ConnectionLimit
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Login and session lifecycle"),
        (name = "Users", description = "User account CRUD"),
        (name = "Events", description = "Event queue and SSE delivery"),
        (name = "Activity", description = "Session heartbeat and liveness")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session destroyed", body = serde_json::Value),
        (status = 400, description = "Unknown session")
    ),
    tag = "Auth",
    security(())
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, body = Vec<UserResponse>)),
    tag = "Users",
    security(())
)]
fn list_users_doc() {}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(())
)]
fn get_user_doc() {}

#[utoipa::path(
    get,
    path = "/api/users/email/{email}",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(())
)]
fn get_user_by_email_doc() {}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 403, description = "Admin role requires an admin caller"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Users",
    security(())
)]
fn create_user_doc() {}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = serde_json::Value),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
fn update_user_doc() {}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = serde_json::Value),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
fn delete_user_doc() {}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = EnqueueRequest,
    responses(
        (status = 200, description = "Enqueue outcome", body = EnqueueResponse),
        (status = 400, description = "Target rule violation")
    ),
    tag = "Events"
)]
fn enqueue_event_doc() {}

#[utoipa::path(
    get,
    path = "/api/events/stream",
    params(StreamQuery),
    responses(
        (status = 200, description = "text/event-stream of queued events"),
        (status = 401, description = "Invalid or expired token")
    ),
    tag = "Events"
)]
fn stream_doc() {}

#[utoipa::path(
    post,
    path = "/api/activity/heartbeat",
    responses((status = 200, description = "Heartbeat registered", body = serde_json::Value)),
    tag = "Activity"
)]
fn heartbeat_doc() {}

#[utoipa::path(
    get,
    path = "/api/activity/sessions",
    responses((status = 200, description = "Active sessions for the caller", body = serde_json::Value)),
    tag = "Activity"
)]
fn active_sessions_doc() {}

#[utoipa::path(
    get,
    path = "/api/activity/check",
    responses((status = 200, description = "Whether the calling session is within the activity window", body = serde_json::Value)),
    tag = "Activity"
)]
fn activity_check_doc() {}
