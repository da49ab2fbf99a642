//! # mdnote API Server
//!
//! Serves the REST API under `/api`, uploaded files under `/uploads` and a
//! health check at `/health`.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Create the database if missing, connect and run migrations
//! 3. Seed the default accounts when `DB_SEED` is set
//! 4. Serve until Ctrl+C, then drain the pool
//!
//! ## Usage
//!
//! ```bash
//! DB_PASSWORD=postgres cargo run -p mdnote-api
//! ```

use anyhow::Context;
use mdnote_api::{
    app::{build_router, AppState},
    config::Config,
};
use mdnote_shared::db::{
    migrations::{ensure_database_exists, run_migrations, seed_default_users},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mdnote_api=debug,mdnote_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("mdnote API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(mode = ?config.server.mode, "Configuration loaded");

    let database_url = config.database.url()?;
    ensure_database_exists(&database_url)
        .await
        .context("Failed to create database")?;

    let pool = create_pool(&DatabaseConfig {
        url: database_url,
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool).await.context("Failed to run migrations")?;

    if config.database.seed {
        let created = seed_default_users(&pool)
            .await
            .context("Failed to seed default users")?;
        tracing::info!(created, "Default users seeded");
    }

    let address = config.bind_address();
    let state = AppState::new(pool.clone(), config);

    state
        .images
        .ensure_dirs()
        .await
        .with_context(|| format!("Failed to create upload directory {}", state.images.root().display()))?;

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
