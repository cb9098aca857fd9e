//! Order management: listing, status changes and deletion.

use sqlx::PgPool;

use halwa_core::order::{ORDER_COLUMNS, OrderRecord};
use halwa_core::{Order, OrderId, OrderStats, OrderStatus};

use super::{RepositoryError, expect_one_row};

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

fn into_order(row: OrderRecord) -> Result<Order, RepositoryError> {
    Order::try_from(row).map_err(RepositoryError::DataCorruption)
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders newest first, optionally narrowed to one status and a search
    /// term.
    ///
    /// The search matches the `HD-` reference, customer name or email,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored tier is unknown.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::order_status IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(into_order)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match search.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => orders
                .into_iter()
                .filter(|order| order.matches_search(query))
                .collect(),
            None => orders,
        })
    }

    /// The `limit` newest orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_order).collect()
    }

    /// Order counts per status across all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let rows = sqlx::query_as::<_, (OrderStatus, i64)>(
            "SELECT status, COUNT(*) FROM orders GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let mut stats = OrderStats::default();
        for (status, count) in rows {
            stats.record(status, u64::try_from(count).unwrap_or_default());
        }
        Ok(stats)
    }

    /// One order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(into_order).transpose()
    }

    /// Set the status and stamp `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(self.pool)
                .await?;
        expect_one_row(result.rows_affected())
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one_row(result.rows_affected())
    }
}
