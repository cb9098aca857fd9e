//! Out-of-band role assignment.
//!
//! # Usage
//!
//! ```bash
//! halwa-cli user grant-admin --email owner@halwadelights.in
//! halwa-cli user revoke-admin --email former@halwadelights.in
//! ```
//!
//! The account must already exist (registered on the storefront). A revoked
//! admin is signed out of the console on their next request.

use halwa_core::{Email, UserRole};

use super::{CommandError, connect};

/// Set the role of the account with `email`.
///
/// # Errors
///
/// Returns `CommandError::InvalidEmail`, `CommandError::UserNotFound` or a
/// database error.
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user_id = sqlx::query_scalar::<_, i32>(
        "UPDATE users SET role = $1, updated_at = NOW() WHERE email = $2 RETURNING id",
    )
    .bind(role)
    .bind(email.as_str())
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    tracing::info!(user_id, email = %email, role = ?role, "Role updated");
    Ok(())
}
