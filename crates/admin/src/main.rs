//! Halwa Delights Admin - Store management console.
//!
//! This binary serves the admin console on port 3001.
//!
//! # Architecture
//!
//! - Axum web framework with Askama templates for server-side rendering
//! - `PostgreSQL` shared with the storefront (catalog, orders, feedback,
//!   users); sessions live in the `admin` schema
//! - Image uploads go to local disk or an HTTP object store
//!
//! Migrations are not run on startup. Run them with `halwa-cli migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use thiserror::Error;

use halwa_admin::config::{AdminConfig, ConfigError};
use halwa_admin::middleware::create_session_layer;
use halwa_admin::middleware::session::SessionStoreError;
use halwa_admin::state::AppState;
use halwa_admin::{app, db, init_sentry, init_tracing};

/// Reasons the server can fail to start or stop cleanly.
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session store: {0}")]
    Session(#[from] SessionStoreError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load configuration from environment (needed for Sentry init)
    let config = AdminConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    if let Some(dir) = config.upload_dir() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let session_layer = create_session_layer(&pool, &config)?;
    let state = AppState::new(config.clone(), pool);
    let router = app(state, session_layer);

    let addr = config.socket_addr();
    tracing::info!("admin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
