//! Session middleware configuration for admin.
//!
//! Sessions live in `admin.session`, apart from storefront sessions, with a
//! shorter expiry and `SameSite=Strict`.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "hd_admin_session";

/// Postgres schema holding the session table.
const SESSION_SCHEMA: &str = "admin";

/// Session table name.
const SESSION_TABLE: &str = "session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

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
    config: &AdminConfig,
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
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/"))
}
