//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! halwa-cli migrate
//! ```
//!
//! Migrations are embedded at compile time from `crates/storefront/migrations/`.
//! The storefront and admin share one database, so there is a single set.

use super::{CommandError, connect};

/// Apply any pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
