//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] halwa_core::EmailError),

    /// Invalid mobile number.
    #[error("invalid mobile number: {0}")]
    InvalidMobile(#[from] halwa_core::MobileError),

    /// Username has other characters than letters and spaces, or is too short.
    #[error("username must be at least 3 letters or spaces")]
    InvalidUsername,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Reset token unknown, expired or already used.
    #[error("invalid or expired reset token")]
    InvalidResetToken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the failure is ours rather than the user's input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
