//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password sign-in restricted to the `admin` role
//! - `storage` - Image uploads to local disk or an HTTP object store

pub mod auth;
pub mod storage;

pub use auth::{AdminAuthError, AdminAuthService};
pub use storage::{HttpObjectStore, ImageUpload, LocalObjectStore, ObjectStore, StorageError};
