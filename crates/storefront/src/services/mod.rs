//! Business logic services.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod email;

pub use auth::{AuthError, AuthService};
pub use catalog::CatalogCache;
pub use email::EmailService;
