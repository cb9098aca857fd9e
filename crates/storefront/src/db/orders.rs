//! Order writes at checkout and customer order history.

use sqlx::PgPool;

use halwa_core::order::{NewOrder, ORDER_COLUMNS, OrderRecord};
use halwa_core::{Email, Order, OrderId, OrderStatus, UserId};

use super::RepositoryError;

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

    /// Insert a new `pending` order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including when
    /// the totals check constraint rejects the row.
    pub async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderId>(
            "INSERT INTO orders (
                 user_id, customer_name, customer_email, customer_phone,
                 shipping_address, shipping_city, shipping_state, shipping_pincode,
                 items, subtotal, shipping_fee, total,
                 payment_method, status, shipping_tier, estimated_delivery
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'pending', $14, $15)
             RETURNING id",
        )
        .bind(order.user_id)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(order.customer.phone.as_str())
        .bind(&order.shipping.address)
        .bind(&order.shipping.city)
        .bind(&order.shipping.state)
        .bind(&order.shipping.pincode)
        .bind(sqlx::types::Json(&order.items))
        .bind(order.totals.subtotal)
        .bind(order.totals.shipping_fee)
        .bind(order.totals.total)
        .bind(order.payment_method)
        .bind(order.shipping_tier.as_str())
        .bind(order.estimated_delivery)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// One order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored tier is unknown.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(into_order).transpose()
    }

    /// Orders placed by a customer, newest first.
    ///
    /// Matches orders linked to the account and guest orders placed with the
    /// same email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        user_id: UserId,
        email: &Email,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE (user_id = $1 OR lower(customer_email) = $2)
               AND ($3::order_status IS NULL OR status = $3)
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .bind(email.as_str())
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_order).collect()
    }
}
