//! Halwa Delights Storefront - Public shop.
//!
//! This binary serves the public-facing storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with Askama templates for server-side rendering
//! - `PostgreSQL` for catalog, orders, feedback, users and sessions
//! - Session-backed cart; no client-side state beyond the session cookie
//! - SMTP (lettre) for password reset and order confirmation mail
//!
//! Migrations are not run on startup. Run them with `halwa-cli migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use thiserror::Error;

use halwa_storefront::config::{ConfigError, StorefrontConfig};
use halwa_storefront::middleware::rate_limit::RateLimitConfigError;
use halwa_storefront::middleware::session::SessionStoreError;
use halwa_storefront::middleware::{RateLimiters, create_session_layer};
use halwa_storefront::state::AppState;
use halwa_storefront::{app, db, init_sentry, init_tracing};

/// Reasons the server can fail to start or stop cleanly.
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("session store: {0}")]
    Session(#[from] SessionStoreError),
    #[error("rate limiter: {0}")]
    RateLimit(#[from] RateLimitConfigError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    let session_layer = create_session_layer(&pool, &config)?;
    let limiters = RateLimiters::new()?;
    let state = AppState::new(config.clone(), pool)?;

    let router = app(state, session_layer, &limiters);

    let addr = config.socket_addr();
    tracing::info!("storefront listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
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
