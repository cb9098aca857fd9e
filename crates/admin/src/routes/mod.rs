//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Dashboard overview
//!
//! # Auth (password login against the shared users table)
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Login action
//! POST /auth/logout                    - Logout
//!
//! # Offers (multipart forms)
//! GET  /offers                         - List with create form
//! POST /offers                         - Create
//! POST /offers/{id}                    - Update
//! POST /offers/{id}/toggle             - Flip enabled
//! POST /offers/{id}/delete             - Delete
//!
//! # Popular this week (multipart forms)
//! GET  /popular                        - List with create form
//! POST /popular                        - Create
//! POST /popular/{id}                   - Update
//! POST /popular/{id}/delete            - Delete
//!
//! # Products (multipart forms)
//! GET  /products                       - Product listing
//! GET  /products/new                   - New product form
//! POST /products                       - Create
//! GET  /products/{id}/edit             - Edit form
//! POST /products/{id}                  - Update
//! POST /products/{id}/delete           - Delete
//!
//! # Orders
//! GET  /orders?status=&q=              - Filtered listing with per-status counts
//! GET  /orders/{id}                    - Order detail
//! POST /orders/{id}/status             - Set status
//! POST /orders/{id}/delete             - Delete
//!
//! # Feedback
//! GET  /feedbacks                      - Grouped by sentiment with summary
//! POST /feedbacks/{id}/status          - Set status
//! POST /feedbacks/{id}/delete          - Delete
//!
//! # JSON API
//! GET  /api/stats                      - Record counts and order stats
//! ```
//!
//! Every mutation redirects back to its list page, which re-reads the table.

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod feedbacks;
pub mod form;
pub mod offers;
pub mod orders;
pub mod popular;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::db::RepositoryError;
use crate::error::Result;
use crate::models::CurrentAdmin;
use crate::services::storage::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Request body limit for forms that may carry an image.
///
/// Leaves room for the text fields around a maximum-size image so the
/// size check in `ImageUpload::validate` reports the real problem.
pub const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Signed-in admin view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub username: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            username: admin.username.clone(),
            email: admin.email.to_string(),
        }
    }
}

/// Layout state for every signed-in page.
#[derive(Debug, Clone)]
pub struct AdminChrome {
    pub admin_user: AdminUserView,
    /// Nav section to highlight, e.g. `"/orders"`.
    pub current_path: &'static str,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

impl AdminChrome {
    /// Build the layout state, resolving any flash codes in `messages`.
    #[must_use]
    pub fn new(admin: &CurrentAdmin, current_path: &'static str, messages: &MessageQuery) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path,
            error: messages.error_message(),
            success: messages.success_message(),
        }
    }

    /// Whether `path` is the highlighted nav section.
    #[must_use]
    pub fn is_current(&self, path: &str) -> bool {
        self.current_path == path
    }
}

/// Query parameters for error/success display after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    /// Display text for `?error=`. Unknown codes show nothing.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_deref().and_then(flash_text)
    }

    /// Display text for `?success=`. Unknown codes show nothing.
    #[must_use]
    pub fn success_message(&self) -> Option<&'static str> {
        self.success.as_deref().and_then(flash_text)
    }
}

/// Message codes carried across redirects.
pub(crate) fn flash_text(code: &str) -> Option<&'static str> {
    let text = match code {
        "forbidden" => "This account does not have admin access.",
        "logged_out" => "You have been signed out.",
        "created" => "Created.",
        "updated" => "Saved.",
        "deleted" => "Deleted.",
        "toggled" => "Offer visibility updated.",
        "status_updated" => "Status updated.",
        "not_found" => "That record no longer exists.",
        "invalid_status" => "Unknown status.",
        "missing_title" => "A title is required.",
        "missing_name" => "A name is required.",
        "invalid_link" => "Button links must start with / or http:// or https://.",
        "invalid_image" => "Only JPEG, PNG, WebP or GIF images can be uploaded.",
        "image_too_large" => "Images must be 5 MB or smaller.",
        "upload_failed" => "The image could not be uploaded. Nothing was saved.",
        _ => return None,
    };
    Some(text)
}

/// `{list}?{key}={code}`.
pub(crate) fn redirect_with(list: &str, key: &str, code: &str) -> Redirect {
    Redirect::to(&format!("{list}?{key}={code}"))
}

/// Redirect back to `list` after a write, reporting a vanished row as a
/// flash message rather than an error page.
///
/// # Errors
///
/// Returns any repository error other than `NotFound`.
pub(crate) fn after_mutation(
    list: &str,
    result: std::result::Result<(), RepositoryError>,
    success: &str,
) -> Result<Redirect> {
    match result {
        Ok(()) => Ok(redirect_with(list, "success", success)),
        Err(RepositoryError::NotFound) => Ok(redirect_with(list, "error", "not_found")),
        Err(e) => Err(e.into()),
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the offer routes router.
pub fn offer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(offers::index).post(offers::create))
        .route("/{id}", post(offers::update))
        .route("/{id}/toggle", post(offers::toggle))
        .route("/{id}/delete", post(offers::delete))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create the popular item routes router.
pub fn popular_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(popular::index).post(popular::create))
        .route("/{id}", post(popular::update))
        .route("/{id}/delete", post(popular::delete))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new_page))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit_page))
        .route("/{id}/delete", post(products::delete))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/delete", post(orders::delete))
}

/// Create the feedback routes router.
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(feedbacks::index))
        .route("/{id}/status", post(feedbacks::update_status))
        .route("/{id}/delete", post(feedbacks::delete))
}

/// Create all routes for the admin console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/offers", offer_routes())
        .nest("/popular", popular_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/feedbacks", feedback_routes())
        .route("/api/stats", get(api::stats))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;

    use super::*;

    fn location(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get(LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_message_query_resolves_known_codes_only() {
        let query = MessageQuery {
            error: Some("image_too_large".to_string()),
            success: Some("<b>hi</b>".to_string()),
        };
        assert!(query.error_message().unwrap().contains("5 MB"));
        assert!(query.success_message().is_none());
    }

    #[test]
    fn test_after_mutation_reports_missing_rows_as_flash() {
        let ok = after_mutation("/offers", Ok(()), "deleted").unwrap();
        assert_eq!(location(ok), "/offers?success=deleted");

        let gone = after_mutation("/offers", Err(RepositoryError::NotFound), "deleted").unwrap();
        assert_eq!(location(gone), "/offers?error=not_found");

        let failed = after_mutation(
            "/offers",
            Err(RepositoryError::Conflict("dup".to_string())),
            "deleted",
        );
        assert!(failed.is_err());
    }

    #[test]
    fn test_upload_limit_exceeds_image_limit() {
        assert!(UPLOAD_BODY_LIMIT > MAX_IMAGE_BYTES);
    }
}
