//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use halwa_core::{Email, UserId};

use super::user::StaffUser;

/// Session-stored admin identity.
///
/// Holds no role. [`RequireAdminAuth`] re-reads it from `users` on every
/// request.
///
/// [`RequireAdminAuth`]: crate::middleware::RequireAdminAuth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name for the header.
    pub username: String,
}

impl From<&StaffUser> for CurrentAdmin {
    fn from(user: &StaffUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
