//! # TaskNest API Server
//!
//! A single-user-session task tracker: users register, log in, and
//! manage a personal task list (add, edit, delete, toggle, filter)
//! behind cookie-based authentication.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasknest-api
//! ```

use chrono::Utc;
use tasknest_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasknest_shared::{
    db::{migrations::run_migrations, pool},
    models::session::Session,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasknest_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskNest API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    // Opportunistic sweep of stale sessions left over from previous runs.
    let swept = Session::purge_expired(&db, Utc::now()).await?;
    if swept > 0 {
        tracing::info!(swept, "Purged expired sessions");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    pool::close_pool(db).await;

    Ok(())
}
