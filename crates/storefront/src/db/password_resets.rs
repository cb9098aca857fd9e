//! Password reset token storage.
//!
//! Only the SHA-256 of a token is stored. A token is usable once, until it
//! expires.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use halwa_core::UserId;

use super::RepositoryError;

/// Repository for password reset tokens.
pub struct PasswordResetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new password reset repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new token hash, retiring any earlier unused tokens for the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE password_reset_tokens SET used_at = NOW()
             WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// The user a live token belongs to, without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_valid(&self, token_hash: &str) -> Result<Option<UserId>, RepositoryError> {
        let user_id = sqlx::query_scalar::<_, i32>(
            "SELECT user_id FROM password_reset_tokens
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(user_id.map(UserId::new))
    }

    /// Mark a live token used and set its user's password, in one
    /// transaction. Returns the user, or `None` if the token was already used,
    /// expired or unknown. The token stays live if the password update fails.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user is gone, or
    /// `RepositoryError::Database` if a query fails.
    pub async fn redeem(
        &self,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let Some(user_id) = sqlx::query_scalar::<_, i32>(
            "UPDATE password_reset_tokens SET used_at = NOW()
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW()
             RETURNING user_id",
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(Some(UserId::new(user_id)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use sqlx::PgPool;

    use super::*;

    async fn pool() -> PgPool {
        PgPool::connect(&std::env::var("DATABASE_URL").unwrap())
            .await
            .unwrap()
    }

    async fn insert_user(pool: &PgPool) -> UserId {
        let email = format!("reset-{}@example.in", uuid::Uuid::new_v4());
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO users (username, mobile, email, password_hash)
             VALUES ('Reset Test', '9876543210', $1, 'old-hash')
             RETURNING id",
        )
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap();
        UserId::new(id)
    }

    async fn password_hash(pool: &PgPool, id: UserId) -> String {
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn delete_user(pool: &PgPool, id: UserId) {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires DATABASE_URL with migrations applied"]
    async fn test_redeem_sets_password_once() {
        let pool = pool().await;
        let user = insert_user(&pool).await;
        let resets = PasswordResetRepository::new(&pool);
        let token_hash = format!("hash-{}", uuid::Uuid::new_v4());
        resets
            .create(user, &token_hash, Utc::now() + Duration::minutes(30))
            .await
            .unwrap();

        assert!(resets.find_valid(&token_hash).await.unwrap().is_some());
        assert_eq!(resets.redeem(&token_hash, "new-hash").await.unwrap(), Some(user));
        assert_eq!(password_hash(&pool, user).await, "new-hash");
        assert!(resets.find_valid(&token_hash).await.unwrap().is_none());

        assert_eq!(resets.redeem(&token_hash, "third-hash").await.unwrap(), None);
        assert_eq!(password_hash(&pool, user).await, "new-hash");

        delete_user(&pool, user).await;
    }

    #[tokio::test]
    #[ignore = "Requires DATABASE_URL with migrations applied"]
    async fn test_expired_token_changes_nothing() {
        let pool = pool().await;
        let user = insert_user(&pool).await;
        let resets = PasswordResetRepository::new(&pool);
        let token_hash = format!("hash-{}", uuid::Uuid::new_v4());
        resets
            .create(user, &token_hash, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(resets.redeem(&token_hash, "new-hash").await.unwrap(), None);
        assert_eq!(password_hash(&pool, user).await, "old-hash");

        delete_user(&pool, user).await;
    }
}
