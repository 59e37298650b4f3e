use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::session::LogoutRequest,
    models::user::{LoginRequest, LoginResponse, UserResponse},
    repositories::{activity, session as session_repo, user as user_repo},
    utils::password::verify_password,
};

pub async fn login(
    State((pool, config)): State<(PgPool, Config)>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // Unknown email and wrong password produce the same answer.
    let user = user_repo::find_by_email(&pool, &payload.email)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .ok_or_else(invalid_credentials)?;

    let password_ok = verify_password(&payload.password, &user.password_hash)
        .map_err(AppError::InternalServerError)?;
    if !password_ok {
        return Err(invalid_credentials());
    }

    let ip_address = client_ip(&headers);
    let user_agent = header_str(&headers, "user-agent");

    let (session, token) = session_repo::create_session(
        &pool,
        &config,
        &user.id,
        ip_address.as_deref(),
        user_agent.as_deref(),
    )
    .await
    .map_err(AppError::InternalServerError)?;

    // Seed the activity record so the session counts as live immediately.
    activity::register_heartbeat(&pool, &user.id, &session.id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        session_id: session.id,
        user: UserResponse::from(user),
    }))
}

pub async fn logout(
    State((pool, _config)): State<(PgPool, Config)>,
    Json(payload): Json<LogoutRequest>,
) -> Result<Json<Value>, AppError> {
    // Store-level deletion is idempotent; the 400 for an unknown session is
    // router UX only.
    let existed = session_repo::destroy_session(&pool, &payload.session_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    if !existed {
        return Err(AppError::BadRequest("Unknown session".to_string()));
    }

    tracing::info!(session_id = %payload.session_id, "session destroyed");

    Ok(Json(json!({ "success": true, "message": "Logged out" })))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .map(|value| value.split(',').next().unwrap_or("").trim().to_string())
        .filter(|value| !value.is_empty())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.1".parse().unwrap(),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_absent_header_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);
    }
}
