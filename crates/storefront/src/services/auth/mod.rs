//! Authentication service.
//!
//! Password accounts with argon2 hashes, profile and email changes, and
//! single-use password reset tokens.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use halwa_core::{Email, MobileNumber, UserId};

use crate::db::{PasswordResetRepository, RepositoryError, UserRepository};
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum username length.
const MIN_USERNAME_LENGTH: usize = 3;

/// Symbols accepted as the required special character.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// Random bytes in a reset token.
const RESET_TOKEN_BYTES: usize = 32;

/// How long a reset token stays valid.
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Registration input as submitted.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'f> {
    pub username: &'f str,
    pub mobile: &'f str,
    pub email: &'f str,
    pub password: &'f str,
    pub password_confirm: &'f str,
}

/// A freshly issued reset token. The plain token only goes into the emailed
/// link; the database keeps its hash.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub user: User,
    pub token: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    resets: PasswordResetRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            resets: PasswordResetRepository::new(pool),
        }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or `AuthError::UserAlreadyExists`
    /// if the email is already registered.
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        let username = validate_username(form.username)?;
        let mobile = MobileNumber::parse_indian(form.mobile)?;
        let email = Email::parse(form.email)?;
        validate_password(form.password)?;
        if form.password != form.password_confirm {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = hash_password(form.password)?;

        self.users
            .create(username, &mobile, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update username and mobile.
    ///
    /// # Errors
    ///
    /// Returns a validation error or `AuthError::UserNotFound`.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        mobile: &str,
    ) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        let mobile = MobileNumber::parse_indian(mobile)?;

        self.users
            .update_profile(user_id, username, &mobile)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Change the login email after re-checking the current password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the password is wrong and
    /// `AuthError::UserAlreadyExists` if another account has the new email.
    pub async fn change_email(
        &self,
        user_id: UserId,
        new_email: &str,
        current_password: &str,
    ) -> Result<User, AuthError> {
        let new_email = Email::parse(new_email)?;

        let password_hash = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        verify_password(current_password, &password_hash)?;

        self.users
            .update_email(user_id, &new_email)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Issue a reset token for `email`.
    ///
    /// Returns `None` when no account matches. Callers must respond the same
    /// way in both cases.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<ResetToken>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.resets
            .create(user.id, &hash_reset_token(&token), expires_at)
            .await?;

        Ok(Some(ResetToken { user, token }))
    }

    /// Whether `token` is live, for rendering the reset form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn reset_token_is_valid(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self
            .resets
            .find_valid(&hash_reset_token(token))
            .await?
            .is_some())
    }

    /// Set a new password with a reset token, consuming the token.
    ///
    /// The password is validated before the token is touched, so a weak
    /// password leaves the token usable.
    ///
    /// # Errors
    ///
    /// Returns a password validation error or `AuthError::InvalidResetToken`.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<User, AuthError> {
        validate_password(password)?;
        if password != password_confirm {
            return Err(AuthError::PasswordMismatch);
        }
        let password_hash = hash_password(password)?;

        let user_id = self
            .resets
            .redeem(&hash_reset_token(token), &password_hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        self.get_user(user_id).await
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Letters and spaces only, at least three characters after trimming.
///
/// # Errors
///
/// Returns `AuthError::InvalidUsername`.
pub fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();
    let valid = username.chars().count() >= MIN_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace());
    if valid {
        Ok(username)
    } else {
        Err(AuthError::InvalidUsername)
    }
}

/// At least eight characters with a lowercase letter, an uppercase letter,
/// a digit and one of `!@#$%^&*`.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` describing the first rule not met.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let checks = [
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "a lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "an uppercase letter",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
        (
            password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)),
            "one of !@#$%^&*",
        ),
    ];
    if let Some((_, missing)) = checks.iter().find(|(ok, _)| !ok) {
        return Err(AuthError::WeakPassword(format!(
            "Password must contain {missing}"
        )));
    }
    Ok(())
}

// =============================================================================
// Hashing
// =============================================================================

/// Hash a password using Argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;

    Ok(hash.to_string())
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password doesn't match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// A random URL-safe reset token.
#[must_use]
pub fn generate_reset_token() -> String {
    let mut bytes = [0_u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of a reset token, hex encoded. This is what gets stored.
#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Halwa@2024").is_ok());
        assert!(matches!(
            validate_password("Ha@1"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("halwa@2024").is_err());
        assert!(validate_password("HALWA@2024").is_err());
        assert!(validate_password("Halwa@halwa").is_err());
        assert!(validate_password("Halwa20245").is_err());
        // Symbols outside the accepted set don't count.
        assert!(validate_password("Halwa_2024").is_err());
    }

    #[test]
    fn test_weak_password_message_names_missing_rule() {
        let Err(AuthError::WeakPassword(msg)) = validate_password("halwa@2024") else {
            panic!("expected weak password");
        };
        assert!(msg.contains("uppercase"));
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(validate_username("  Meena Kumari ").unwrap(), "Meena Kumari");
        assert!(validate_username("Al").is_err());
        assert!(validate_username("R2D2 Fan").is_err());
        assert!(validate_username("   ").is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Halwa@2024").unwrap();
        assert!(verify_password("Halwa@2024", &hash).is_ok());
        assert!(matches!(
            verify_password("Halwa@2025", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(verify_password("Halwa@2024", "not-a-hash").is_err());
    }

    #[test]
    fn test_reset_token_shape() {
        let token = generate_reset_token();
        // 32 bytes, unpadded base64url
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn test_reset_token_hash_is_stable_hex() {
        let hash = hash_reset_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
