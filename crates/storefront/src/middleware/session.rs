//! Session middleware configuration.
//!
//! Sessions are stored in `storefront.session` using tower-sessions'
//! `PostgresStore`. The table is created by the shared migration.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hd_session";

/// Postgres schema holding the session table.
const SESSION_SCHEMA: &str = "storefront";

/// Session table name.
const SESSION_TABLE: &str = "session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The store rejected the configured schema or table name.
#[derive(Debug, thiserror::Error)]
#[error("invalid session store identifier: {0}")]
pub struct SessionStoreError(String);

/// Create the session layer with `PostgreSQL` store.
///
/// # Errors
///
/// Returns `SessionStoreError` if the store rejects the schema or table name.
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore>, SessionStoreError> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(SessionStoreError)?
        .with_table_name(SESSION_TABLE)
        .map_err(SessionStoreError)?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/"))
}
