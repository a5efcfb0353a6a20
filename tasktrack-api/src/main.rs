//! # Tasktrack API Server
//!
//! Multi-user task tracker: accounts with bearer tokens, and personal tasks
//! that move from `pending` to `in_progress` to `done`.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Connect to PostgreSQL and apply migrations
//! 3. Serve the API and the static client shell until Ctrl-C
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/tasktrack \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p tasktrack-api
//! ```

use std::sync::Arc;

use tasktrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktrack_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
    store::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "tasktrack_api=debug,tasktrack_shared=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Tasktrack API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(config.database_config()).await?;
    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete, closing database pool");
    close_pool(pool).await;

    Ok(())
}

/// Plain or JSON log output, picked by `LOG_FORMAT`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
