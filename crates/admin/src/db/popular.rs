//! The "popular this week" cards.

use sqlx::PgPool;

use halwa_core::{PopularItem, PopularItemId};

use super::{RepositoryError, expect_one_row};

/// Editable popular item fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularInput {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// Repository for popular items.
pub struct PopularRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PopularRepository<'a> {
    /// Create a new popular item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every item, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PopularItem>, RepositoryError> {
        let items = sqlx::query_as::<_, PopularItem>(
            "SELECT id, name, description, image_url, created_at, updated_at
             FROM popular_week
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Insert an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &PopularInput) -> Result<PopularItemId, RepositoryError> {
        let id = sqlx::query_scalar::<_, PopularItemId>(
            "INSERT INTO popular_week (name, description, image_url)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Replace every editable field of an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn update(
        &self,
        id: PopularItemId,
        input: &PopularInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE popular_week
             SET name = $2, description = $3, image_url = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .execute(self.pool)
        .await?;
        expect_one_row(result.rows_affected())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn delete(&self, id: PopularItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM popular_week WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one_row(result.rows_affected())
    }
}
