//! Feedback submission.

use sqlx::PgPool;

use halwa_core::{FeedbackId, FeedbackSource, Rating};

use super::RepositoryError;

/// A feedback entry to insert. Status always starts `new`.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    /// `None` for contact messages.
    pub rating: Option<Rating>,
    pub message: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: FeedbackSource,
}

/// Repository for writing feedback.
pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a feedback entry and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, feedback: &NewFeedback) -> Result<FeedbackId, RepositoryError> {
        let id = sqlx::query_scalar::<_, FeedbackId>(
            "INSERT INTO feedbacks (rating, message, name, email, phone, source, status)
             VALUES ($1, $2, $3, $4, $5, $6, 'new')
             RETURNING id",
        )
        .bind(feedback.rating)
        .bind(&feedback.message)
        .bind(feedback.name.as_deref())
        .bind(feedback.email.as_deref())
        .bind(feedback.phone.as_deref())
        .bind(feedback.source)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }
}
