//! Feedback triage.

use sqlx::PgPool;

use halwa_core::{Feedback, FeedbackId, FeedbackStatus};

use super::{RepositoryError, expect_one_row};

/// Repository for feedback entries.
pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every entry, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Feedback>, RepositoryError> {
        let feedbacks = sqlx::query_as::<_, Feedback>(
            "SELECT id, rating, message, name, email, phone, source, status, created_at
             FROM feedbacks
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(feedbacks)
    }

    /// Move an entry to `status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist.
    pub async fn set_status(
        &self,
        id: FeedbackId,
        status: FeedbackStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE feedbacks SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;
        expect_one_row(result.rows_affected())
    }

    /// Delete an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist.
    pub async fn delete(&self, id: FeedbackId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one_row(result.rows_affected())
    }
}
