//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{AdminConfig, StorageConfig};
use crate::services::{HttpObjectStore, LocalObjectStore, ObjectStore};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    store: Box<dyn ObjectStore>,
}

impl AppState {
    /// Create a new application state, picking the object store from config.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let store: Box<dyn ObjectStore> = match &config.storage {
            StorageConfig::Local { dir, public_url } => {
                tracing::info!(dir = %dir.display(), "Storing uploads on local disk");
                Box::new(LocalObjectStore::new(dir.clone(), public_url.clone()))
            }
            StorageConfig::Http {
                endpoint,
                token,
                public_url,
            } => {
                tracing::info!(endpoint = %endpoint, "Storing uploads in object store");
                Box::new(HttpObjectStore::new(
                    endpoint.clone(),
                    token.clone(),
                    public_url.clone(),
                ))
            }
        };
        Self::with_store(config, pool, store)
    }

    /// Create a state around an explicit object store.
    #[must_use]
    pub fn with_store(config: AdminConfig, pool: PgPool, store: Box<dyn ObjectStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                store,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the image upload destination.
    #[must_use]
    pub fn store(&self) -> &dyn ObjectStore {
        self.inner.store.as_ref()
    }
}
