//! The streaming session handler: one long-lived connection that heartbeats,
//! drains the event queue, and writes framed events until it times out or the
//! client goes away.
//!
//! Lifecycle per connection: authenticate, admit, stream, terminate. The
//! handler authenticates and admits before spawning [`run`]; everything after
//! admission lives here. Cross-connection coordination happens only through
//! Postgres, so any number of processes can host streams concurrently.

use axum::response::sse::Event as SseEvent;
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

use crate::config::Config;
use crate::repositories::{activity, event as event_repo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// No successful heartbeat within the inactivity window.
    Timeout,
    /// The client went away; detected as a closed channel.
    Disconnected,
}

/// Drives one admitted streaming connection to completion, then runs the
/// terminating finalizer. The finalizer is unconditional: every exit path of
/// the loop, including disconnects, ends with the (user, session) pair marked
/// inactive.
pub async fn run(
    pool: PgPool,
    config: Config,
    user_id: String,
    session_id: String,
    tx: mpsc::Sender<SseEvent>,
) {
    let reason = stream_loop(&pool, &config, &user_id, &session_id, &tx).await;

    tracing::info!(
        user_id = %user_id,
        session_id = %session_id,
        reason = ?reason,
        "stream terminated"
    );

    if let Err(err) = activity::mark_inactive(&pool, &user_id, &session_id).await {
        tracing::error!(
            user_id = %user_id,
            session_id = %session_id,
            error = %err,
            "failed to mark session inactive during stream teardown"
        );
    }
}

/// The cooperative poll loop. Single-threaded per connection; the only
/// intentional suspension is the sleep between iterations.
pub async fn stream_loop(
    pool: &PgPool,
    config: &Config,
    user_id: &str,
    session_id: &str,
    tx: &mpsc::Sender<SseEvent>,
) -> ExitReason {
    let mut last_activity = Instant::now();

    loop {
        if last_activity.elapsed() > config.inactivity_timeout() {
            if let Err(err) = activity::mark_inactive(pool, user_id, session_id).await {
                tracing::warn!(session_id = %session_id, error = %err, "mark_inactive failed on timeout");
            }
            let _ = send_event(
                tx,
                "connection_timeout",
                serde_json::json!({ "message": "connection closed due to inactivity" }),
            )
            .await;
            return ExitReason::Timeout;
        }

        // The activity clock only resets on a successful heartbeat, so a
        // store that keeps failing eventually times the connection out
        // instead of keeping a dead session alive forever.
        match activity::register_heartbeat(pool, user_id, session_id).await {
            Ok(()) => last_activity = Instant::now(),
            Err(err) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %err,
                    "heartbeat failed, retrying next cycle"
                );
            }
        }

        match event_repo::drain(pool, user_id, session_id).await {
            Ok(events) => {
                for event in events {
                    tracing::debug!(
                        event_id = event.id,
                        event_type = %event.event_type,
                        session_id = %session_id,
                        "delivering event"
                    );
                    if send_event(tx, &event.event_type, event.payload())
                        .await
                        .is_err()
                    {
                        return ExitReason::Disconnected;
                    }
                }
            }
            Err(err) => {
                // Tolerated for this iteration; the rows stay undelivered
                // and the next poll picks them up.
                tracing::warn!(
                    session_id = %session_id,
                    error = %err,
                    "drain failed, retrying next cycle"
                );
            }
        }

        tokio::select! {
            _ = tx.closed() => return ExitReason::Disconnected,
            _ = sleep(config.heartbeat_interval()) => {}
        }
    }
}

/// Frames one event for the wire (`event: <type>` / `data: <json>`); each
/// event is an independent unit flushed on its own.
async fn send_event(
    tx: &mpsc::Sender<SseEvent>,
    event_type: &str,
    payload: Value,
) -> Result<(), mpsc::error::SendError<SseEvent>> {
    tx.send(SseEvent::default().event(event_type).data(payload.to_string()))
        .await
}

/// Terminal error frame for connections rejected at admission. No loop is
/// entered and no activity row is touched.
pub fn admission_rejected_event(message: &str) -> SseEvent {
    SseEvent::default()
        .event("error")
        .data(serde_json::json!({ "message": message }).to_string())
}
