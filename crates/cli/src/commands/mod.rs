//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string, falling back to
//!   `STOREFRONT_DATABASE_URL`

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use halwa_core::EmailError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The seed file could not be read.
    #[error("Could not read seed file: {0}")]
    SeedFile(#[from] std::io::Error),

    /// The seed file is not valid YAML for a catalog.
    #[error("Invalid seed file: {0}")]
    SeedParse(#[from] serde_yaml::Error),

    /// The seed file parsed but has bad entries.
    #[error("{0} seed validation errors found")]
    SeedValidation(usize),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account has this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

/// Database URL from the environment.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if neither variable is set.
pub fn database_url() -> Result<SecretString, CommandError> {
    std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("STOREFRONT_DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))
}

/// Connect using [`database_url`].
///
/// # Errors
///
/// Returns an error if the URL is missing or the connection fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}
