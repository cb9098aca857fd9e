//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use halwa_core::{Email, MobileNumber, UserId, UserRole};

/// A customer account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Contact mobile number.
    pub mobile: MobileNumber,
    /// Login email, unique across accounts.
    pub email: Email,
    /// Role as stored; only ever changed from the CLI.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
