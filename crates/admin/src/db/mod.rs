//! Database access for the admin console.
//!
//! The admin shares the storefront's database and migrations. It writes the
//! catalog (`products`, `offers`, `popular_week`), order status and feedback
//! triage, and reads `users` only to check credentials and roles.
//!
//! # Tables
//!
//! - `users` - Credentials and role (read-only here)
//! - `products`, `offers`, `popular_week` - Catalog CRUD
//! - `orders` - Listing, status changes, deletion
//! - `feedbacks` - Listing, status changes, deletion
//! - `admin.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p halwa-cli -- migrate
//! ```

pub mod dashboard;
pub mod feedbacks;
pub mod offers;
pub mod orders;
pub mod popular;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use dashboard::{DashboardCounts, DashboardRepository};
pub use feedbacks::FeedbackRepository;
pub use offers::{OfferInput, OfferRepository};
pub use orders::OrderRepository;
pub use popular::{PopularInput, PopularRepository};
pub use products::{ProductInput, ProductRepository};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// `NotFound` unless the statement touched a row.
pub(crate) const fn expect_one_row(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_one_row() {
        assert!(expect_one_row(1).is_ok());
        assert!(matches!(expect_one_row(0), Err(RepositoryError::NotFound)));
    }
}
