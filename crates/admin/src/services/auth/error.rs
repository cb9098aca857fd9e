//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin sign-in.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The password was right but the account is not an admin.
    #[error("account is not an admin")]
    NotAdmin,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AdminAuthError {
    /// Client-safe wording for the login form.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password",
            Self::NotAdmin => "This account does not have admin access",
            Self::Repository(_) => "Something went wrong. Please try again.",
        }
    }
}
