use akani_backend::{
    config::Config,
    db::connection::create_pool,
    repositories::{activity, event as event_repo, session as session_repo},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_cleanup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let deleted_events = event_repo::cleanup_delivered_before(&pool, config.event_retention_days)
        .await
        .expect("cleanup delivered events");
    if deleted_events > 0 {
        tracing::info!("Deleted {} delivered events", deleted_events);
    }

    let deleted_sessions =
        session_repo::cleanup_expired_sessions(&pool, config.session_lifetime_seconds)
            .await
            .expect("cleanup expired sessions");
    if deleted_sessions > 0 {
        tracing::info!("Deleted {} expired sessions", deleted_sessions);
    }

    let deleted_activity = activity::cleanup_inactive(&pool, config.activity_retention_hours)
        .await
        .expect("cleanup stale activity records");
    if deleted_activity > 0 {
        tracing::info!("Deleted {} stale activity records", deleted_activity);
    }

    sqlx::query("VACUUM (ANALYZE) sse_events")
        .execute(&pool)
        .await
        .expect("vacuum sse_events table");

    sqlx::query("VACUUM (ANALYZE) sessions")
        .execute(&pool)
        .await
        .expect("vacuum sessions table");

    Ok(())
}
