//! Admin authentication service.
//!
//! Admins sign in with the same email and password they use on the
//! storefront. Only accounts whose role is `admin` get through.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use sqlx::PgPool;

use halwa_core::Email;

use crate::db::UserRepository;
use crate::models::StaffUser;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Check an email and password and require the `admin` role.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AdminAuthError::NotAdmin` if the account is a customer.
    pub async fn login(&self, email: &str, password: &str) -> Result<StaffUser, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.role.is_admin() {
            return Err(AdminAuthError::NotAdmin);
        }

        Ok(user)
    }
}

/// Verify a password against an argon2 hash.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidCredentials` if the password doesn't match
/// or the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    use super::*;

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_verify_password() {
        let stored = hash("Kesari@2024");
        assert!(verify_password("Kesari@2024", &stored).is_ok());
        assert!(matches!(
            verify_password("kesari@2024", &stored),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unreadable_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "plaintext-in-db"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_user_messages_do_not_leak_internals() {
        assert_eq!(
            AdminAuthError::InvalidCredentials.user_message(),
            "Invalid email or password"
        );
        assert!(AdminAuthError::NotAdmin.user_message().contains("admin access"));
    }
}
