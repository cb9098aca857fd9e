//! Read-only catalog queries: products, offers and the weekly popular list.

use sqlx::PgPool;

use halwa_core::{Offer, PopularItem, Product, ProductId};

use super::RepositoryError;

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, category, image_url, created_at, updated_at
             FROM products
             ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// One product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, category, image_url, created_at, updated_at
             FROM products
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Enabled offers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_enabled_offers(&self) -> Result<Vec<Offer>, RepositoryError> {
        let offers = sqlx::query_as::<_, Offer>(
            "SELECT id, title, description, button_text, button_link, image_url,
                    enabled, created_at, updated_at
             FROM offers
             WHERE enabled
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(offers)
    }

    /// This week's popular items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_popular(&self) -> Result<Vec<PopularItem>, RepositoryError> {
        let items = sqlx::query_as::<_, PopularItem>(
            "SELECT id, name, description, image_url, created_at, updated_at
             FROM popular_week
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }
}
