//! Producer and consumer edges of the event channel: enqueue plus the
//! long-lived SSE stream.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Query, State},
    http::HeaderMap,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::bearer_token,
    models::event::{EnqueueRequest, EnqueueResponse, TargetType},
    models::session::AuthSession,
    repositories::{activity, event as event_repo, session as session_repo},
    services::stream,
};

/// Producer surface. Target-rule violations are 400s; storage failures are
/// swallowed into `{success: false}` so they never break the caller's
/// primary operation.
pub async fn enqueue(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(_session): Extension<AuthSession>,
    Json(payload): Json<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>, AppError> {
    payload.validate()?;

    let target_id = match payload.target_type {
        TargetType::Session => Some(payload.session_id.as_deref().ok_or_else(|| {
            AppError::BadRequest("session_id is required for target_type \"session\"".to_string())
        })?),
        TargetType::User => Some(payload.user_id.as_deref().ok_or_else(|| {
            AppError::BadRequest("user_id is required for target_type \"user\"".to_string())
        })?),
        TargetType::All => {
            if payload.session_id.is_some() || payload.user_id.is_some() {
                return Err(AppError::BadRequest(
                    "target ids are not allowed for target_type \"all\"".to_string(),
                ));
            }
            None
        }
    };

    match event_repo::enqueue(
        &pool,
        &payload.event_type,
        payload.target_type,
        target_id,
        &payload.data,
    )
    .await
    {
        Ok(event) => {
            tracing::debug!(
                event_id = event.id,
                event_type = %event.event_type,
                target_type = %event.target_type.as_str(),
                "event enqueued"
            );
            Ok(Json(EnqueueResponse {
                success: true,
                message: "Event enqueued".to_string(),
            }))
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to enqueue event");
            Ok(Json(EnqueueResponse {
                success: false,
                message: "Failed to enqueue event".to_string(),
            }))
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StreamQuery {
    /// Bearer token fallback; the browser EventSource API cannot set headers.
    pub token: Option<String>,
}

/// Opens the long-lived notification stream: authenticate, admit against the
/// per-user connection cap, then hand the connection to the streaming loop.
pub async fn open_stream(
    State((pool, config)): State<(PgPool, Config)>,
    headers: HeaderMap,
    Query(query): Query<StreamQuery>,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers)
        .or(query.token)
        .ok_or_else(AppError::unauthenticated)?;

    let auth_session = session_repo::validate_token(&pool, &config, &token)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .ok_or_else(AppError::unauthenticated)?;

    let user_id = auth_session.user.id;
    let session_id = auth_session.session_id;

    let limit = activity::check_connection_limit(&pool, &config, &user_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    if !limit.can_connect {
        tracing::warn!(
            user_id = %user_id,
            current = limit.current_connections,
            max = limit.max_connections,
            "stream rejected: connection limit reached"
        );
        // One terminal error frame; no loop, no activity mutation.
        let rejection = tokio_stream::once(Ok::<_, Infallible>(
            stream::admission_rejected_event("Concurrent connection limit reached"),
        ));
        return Ok(Sse::new(rejection).into_response());
    }

    let (tx, rx) = mpsc::channel::<SseEvent>(32);

    // Opening comment frame keeps proxies from buffering the response.
    let _ = tx.send(SseEvent::default().comment("connected")).await;

    tokio::spawn(stream::run(
        pool.clone(),
        config.clone(),
        user_id,
        session_id,
        tx,
    ));

    let events = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(events)
        .keep_alive(
            KeepAlive::new()
                .interval(config.heartbeat_interval())
                .text("keep-alive"),
        )
        .into_response())
}
