//! Explicit heartbeat and liveness endpoints for idle-detection-sensitive
//! clients.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    config::Config, error::AppError, models::session::AuthSession, repositories::activity,
};

pub async fn heartbeat(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    activity::register_heartbeat(&pool, session.user_id(), &session.session_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    Ok(Json(json!({ "success": true, "message": "Heartbeat registered" })))
}

pub async fn list_sessions(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    let sessions = activity::list_active_sessions(&pool, &config, session.user_id())
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    Ok(Json(json!({ "success": true, "sessions": sessions })))
}

pub async fn check(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    let is_active = activity::is_active(&pool, &config, session.user_id(), &session.session_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    Ok(Json(json!({ "success": true, "is_active": is_active })))
}
