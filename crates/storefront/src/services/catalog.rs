//! Cached catalog reads.
//!
//! Products, offers and popular items are read on nearly every page and
//! change only through the admin console. They are cached with `moka` for
//! a short TTL so admin edits show up within a minute.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use halwa_core::{Offer, PopularItem, Product, ProductId};

use crate::db::{CatalogRepository, RepositoryError};

/// Cache key for catalog listings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Offers,
    Popular,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Offers(Arc<Vec<Offer>>),
    Popular(Arc<Vec<PopularItem>>),
}

/// Catalog reader with a shared cache.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl CatalogCache {
    /// Create a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();
        Self { cache }
    }

    /// All products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails.
    #[instrument(skip(self, pool))]
    pub async fn products(&self, pool: &PgPool) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }
        let products = Arc::new(CatalogRepository::new(pool).list_products().await?);
        self.cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// One product, served from the cached listing when present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails.
    pub async fn product(
        &self,
        pool: &PgPool,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await
            && let Some(product) = products.iter().find(|p| p.id == id)
        {
            return Ok(Some(product.clone()));
        }
        CatalogRepository::new(pool).get_product(id).await
    }

    /// Enabled offers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails.
    #[instrument(skip(self, pool))]
    pub async fn offers(&self, pool: &PgPool) -> Result<Arc<Vec<Offer>>, RepositoryError> {
        if let Some(CacheValue::Offers(offers)) = self.cache.get(&CacheKey::Offers).await {
            return Ok(offers);
        }
        let offers = Arc::new(CatalogRepository::new(pool).list_enabled_offers().await?);
        self.cache
            .insert(CacheKey::Offers, CacheValue::Offers(Arc::clone(&offers)))
            .await;
        Ok(offers)
    }

    /// This week's popular items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails.
    #[instrument(skip(self, pool))]
    pub async fn popular(&self, pool: &PgPool) -> Result<Arc<Vec<PopularItem>>, RepositoryError> {
        if let Some(CacheValue::Popular(items)) = self.cache.get(&CacheKey::Popular).await {
            return Ok(items);
        }
        let items = Arc::new(CatalogRepository::new(pool).list_popular().await?);
        self.cache
            .insert(CacheKey::Popular, CacheValue::Popular(Arc::clone(&items)))
            .await;
        Ok(items)
    }
}
