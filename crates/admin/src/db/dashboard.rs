//! Row counts for the dashboard.

use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

/// How many rows each managed table holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DashboardCounts {
    pub offers: i64,
    pub popular: i64,
    pub products: i64,
    pub feedbacks: i64,
}

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count offers, popular items, products and feedbacks in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<DashboardCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            "SELECT
                 (SELECT COUNT(*) FROM offers) AS offers,
                 (SELECT COUNT(*) FROM popular_week) AS popular,
                 (SELECT COUNT(*) FROM products) AS products,
                 (SELECT COUNT(*) FROM feedbacks) AS feedbacks",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(counts)
    }
}
