//! Domain models for the admin console.

pub mod feedback;
pub mod session;
pub mod user;

pub use feedback::{FeedbackGroups, FeedbackSummary};
pub use session::{CurrentAdmin, keys as session_keys};
pub use user::StaffUser;
