//! Credential and role lookups.
//!
//! Roles are granted with `halwa-cli`; nothing here writes to `users`.

use sqlx::PgPool;

use halwa_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::StaffUser;

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: UserId,
    username: String,
    email: String,
    role: UserRole,
    password_hash: String,
}

/// Repository for reading accounts.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// An account and its password hash, by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(StaffUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, email, role, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Some((
            StaffUser {
                id: row.id,
                username: row.username,
                email,
                role: row.role,
            },
            row.password_hash,
        )))
    }

    /// Current role of an account, or `None` if it no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_role(&self, id: UserId) -> Result<Option<UserRole>, RepositoryError> {
        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(role)
    }
}
