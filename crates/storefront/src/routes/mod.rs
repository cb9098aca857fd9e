//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Home page (offers, popular, featured)
//!
//! # Catalog
//! GET  /products?category=&price=      - Product listing with filters
//! GET  /products/{id}                  - Product detail
//!
//! # Cart (session-backed, each POST redirects to /cart)
//! GET  /cart                           - Cart page
//! POST /cart/add                       - Add a product
//! POST /cart/{index}/quantity          - Change quantity by +/-1
//! POST /cart/{index}/remove            - Remove a line
//! POST /cart/clear                     - Empty the cart
//!
//! # Checkout
//! GET  /checkout                       - Checkout form with shipping quote
//! POST /checkout                       - Place order
//! GET  /orders/{id}/confirmation       - Order confirmation
//!
//! # Auth
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Login action
//! GET  /auth/register                  - Register page
//! POST /auth/register                  - Register action
//! POST /auth/logout                    - Logout action
//! GET  /auth/forgot-password           - Request a reset link
//! POST /auth/forgot-password
//! GET  /auth/reset-password?token=     - Set a new password
//! POST /auth/reset-password?token=
//!
//! # Account (requires auth)
//! GET  /account                        - Profile
//! POST /account/profile                - Update name and mobile
//! POST /account/email                  - Change email (re-authenticates)
//! GET  /account/orders?status=         - Order history
//! POST /account/orders/{id}/reorder    - Copy an order into the cart
//!
//! # Feedback
//! GET  /feedback                       - Rating form
//! POST /feedback
//! GET  /contact                        - Contact form
//! POST /contact
//!
//! # JSON API
//! GET  /api/cart/count                 - {"count": n}
//! POST /api/shipping/quote             - Shipping quote for an address
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod feedback;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::middleware::RateLimiters;
use crate::models::CurrentUser;
use crate::services::cart::load_cart;
use crate::state::AppState;

/// Header state shared by every page: who is signed in and the cart badge.
#[derive(Debug, Clone, Default)]
pub struct PageChrome {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
}

impl PageChrome {
    /// Build the header state for the current session.
    pub async fn load(session: &Session, user: Option<CurrentUser>) -> Self {
        Self {
            user,
            cart_count: load_cart(session).await.item_count(),
        }
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
fn flash_text(code: &str) -> Option<&'static str> {
    let text = match code {
        "added" => "Added to your cart.",
        "updated" => "Cart updated.",
        "removed" => "Item removed from your cart.",
        "cleared" => "Your cart is now empty.",
        "min_quantity" => "Quantity can't go below 1. Use Remove to delete the item.",
        "missing_line" => "That cart item no longer exists.",
        "unknown_product" => "That product is no longer available.",
        "reordered" => "Items from your order were added to your cart.",
        "reordered_partial" => {
            "Some items are no longer sold and were skipped. The rest were added to your cart."
        }
        "reorder_empty" => "None of the items in that order are still available.",
        "reorder_not_delivered" => "Only delivered orders can be ordered again.",
        "registered" => "Account created. Welcome to Halwa Delights!",
        "logged_out" => "You have been signed out.",
        "reset_sent" => {
            "If an account exists for that email, a password reset link is on its way."
        }
        "password_reset" => "Your password has been updated. Please sign in.",
        "invalid_reset_link" => "That reset link is invalid or has expired.",
        "profile_updated" => "Profile updated.",
        "email_updated" => "Email address updated.",
        "session" => "Your session could not be saved. Please try again.",
        "login_required" => "Please sign in to continue.",
        _ => return None,
    };
    Some(text)
}

/// Create the auth routes router.
pub fn auth_routes(limiters: &RateLimiters) -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(limiters.auth.clone());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route("/reset-password", get(auth::reset_password_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/clear", post(cart::clear))
        .route("/{index}/quantity", post(cart::change_quantity))
        .route("/{index}/remove", post(cart::remove))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/email", post(account::change_email))
        .route("/orders", get(orders::history))
        .route("/orders/{id}/reorder", post(orders::reorder))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/count", get(api::cart::count))
        .route("/shipping/quote", post(api::shipping::quote))
}

/// Form submissions that create records.
fn submission_routes(limiters: &RateLimiters) -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::place_order))
        .route("/feedback", post(feedback::submit_feedback))
        .route("/contact", post(feedback::submit_contact))
        .layer(limiters.checkout.clone())
}

/// Create all routes for the storefront.
pub fn routes(limiters: &RateLimiters) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show))
        .route("/orders/{id}/confirmation", get(orders::confirmation))
        .route("/feedback", get(feedback::feedback_page))
        .route("/contact", get(feedback::contact_page))
        .merge(submission_routes(limiters))
        .nest("/account", account_routes())
        .nest("/auth", auth_routes(limiters))
        .nest("/api", api_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_query_resolves_known_codes_only() {
        let query = MessageQuery {
            error: Some("min_quantity".to_string()),
            success: Some("<script>".to_string()),
        };
        assert!(query.error_message().unwrap().contains("below 1"));
        assert!(query.success_message().is_none());
        assert!(MessageQuery::default().error_message().is_none());
    }
}
