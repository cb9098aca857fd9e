//! Integration tests for Halwa Delights.
//!
//! # Running Tests
//!
//! ```bash
//! # Pure checkout and shipping flows (no services needed)
//! cargo test -p halwa-integration-tests
//!
//! # Live HTTP tests against running servers
//! cargo run -p halwa-storefront &
//! cargo run -p halwa-admin &
//! cargo test -p halwa-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - defaults to `http://localhost:3000`
//! - `ADMIN_BASE_URL` - defaults to `http://localhost:3001`
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - an account granted admin
//!   with `halwa-cli user grant-admin`

use halwa_core::{Cart, CartProduct, ProductId, Rupees};

/// Base URL of a running storefront.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of a running admin console.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client that keeps cookies and does not follow redirects, so tests
/// can assert on `Location`.
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub fn session_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// A catalog entry with a whole-rupee price.
#[must_use]
pub fn product(id: i32, name: &str, rupees: u32) -> CartProduct {
    CartProduct {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Rupees::from_whole(rupees),
        image: None,
    }
}

/// A cart filled from `(product, quantity)` pairs.
#[must_use]
pub fn cart_with(lines: &[(CartProduct, u32)]) -> Cart {
    let mut cart = Cart::new();
    for (item, quantity) in lines {
        cart.add_quantity(item.clone(), *quantity);
    }
    cart
}
