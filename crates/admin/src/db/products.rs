//! Product catalog writes.

use sqlx::PgPool;

use halwa_core::{Product, ProductId, Rupees};

use super::{RepositoryError, expect_one_row};

const PRODUCT_COLUMNS: &str = "id, name, price, category, image_url, created_at, updated_at";

/// Editable product fields. `price` is non-negative by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub price: Rupees,
    pub category: String,
    pub image_url: Option<String>,
}

/// Repository for products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// One product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            "INSERT INTO products (name, price, category, image_url)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.category)
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Replace every editable field of a product.
    ///
    /// Carts and past orders keep the snapshot they took.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products
             SET name = $2, price = $3, category = $4, image_url = $5, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.category)
        .bind(input.image_url.as_deref())
        .execute(self.pool)
        .await?;
        expect_one_row(result.rows_affected())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one_row(result.rows_affected())
    }
}
