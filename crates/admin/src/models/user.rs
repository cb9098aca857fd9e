//! Accounts as the admin sees them.

use halwa_core::{Email, UserId, UserRole};

/// An account that tried to sign in to the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffUser {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: UserRole,
}
