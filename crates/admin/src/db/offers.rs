//! Home page offer banners.

use sqlx::PgPool;

use halwa_core::{Offer, OfferId};

use super::{RepositoryError, expect_one_row};

const OFFER_COLUMNS: &str = "id, title, description, button_text, button_link, image_url, \
     enabled, created_at, updated_at";

/// Editable offer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferInput {
    pub title: String,
    pub description: String,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub image_url: Option<String>,
    pub enabled: bool,
}

/// Repository for offers.
pub struct OfferRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OfferRepository<'a> {
    /// Create a new offer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every offer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Offer>, RepositoryError> {
        let offers = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(offers)
    }

    /// Insert an offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &OfferInput) -> Result<OfferId, RepositoryError> {
        let id = sqlx::query_scalar::<_, OfferId>(
            "INSERT INTO offers (title, description, button_text, button_link, image_url, enabled)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.button_text.as_deref())
        .bind(input.button_link.as_deref())
        .bind(input.image_url.as_deref())
        .bind(input.enabled)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Replace every editable field of an offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the offer doesn't exist.
    pub async fn update(&self, id: OfferId, input: &OfferInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE offers
             SET title = $2, description = $3, button_text = $4, button_link = $5,
                 image_url = $6, enabled = $7, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.button_text.as_deref())
        .bind(input.button_link.as_deref())
        .bind(input.image_url.as_deref())
        .bind(input.enabled)
        .execute(self.pool)
        .await?;
        expect_one_row(result.rows_affected())
    }

    /// Flip `enabled` and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the offer doesn't exist.
    pub async fn toggle(&self, id: OfferId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE offers SET enabled = NOT enabled, updated_at = NOW()
             WHERE id = $1
             RETURNING enabled",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the offer doesn't exist.
    pub async fn delete(&self, id: OfferId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one_row(result.rows_affected())
    }
}
