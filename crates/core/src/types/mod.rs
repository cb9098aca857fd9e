//! Core types for Halwa Delights.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod mobile;
pub mod price;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use mobile::{MobileError, MobileNumber};
pub use price::{PriceError, Rupees};
pub use rating::{Rating, RatingError, Sentiment};
pub use status::*;
