//! Cart route handlers.
//!
//! The cart is held in the session. Every POST rewrites it and redirects
//! back to `/cart` with a message code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use halwa_core::shipping::FREE_SHIPPING_THRESHOLD;
use halwa_core::{Cart, CartProduct, ProductId, Rupees};

use super::{MessageQuery, PageChrome};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::cart::{load_cart, update_cart};
use crate::state::AppState;

/// Most units of one product a single add may request.
const MAX_ADD_QUANTITY: u32 = 50;

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartLineView {
    /// Position in the cart, used in the line's form actions.
    pub index: usize,
    pub product_id: i32,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart totals display data.
#[derive(Debug, Clone)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: String,
    /// How much more buys free shipping, if not already reached.
    pub free_shipping_remaining: Option<String>,
}

impl CartSummary {
    /// Summarize `cart` for display.
    #[must_use]
    pub fn of(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let threshold = Rupees::from_whole(FREE_SHIPPING_THRESHOLD);
        let remaining = (subtotal < threshold)
            .then(|| Rupees::new(Decimal::from(threshold) - Decimal::from(subtotal)).ok())
            .flatten();
        Self {
            item_count: cart.item_count(),
            subtotal: subtotal.to_string(),
            free_shipping_remaining: remaining.map(|r| r.to_string()),
        }
    }
}

/// Build line views for a cart.
#[must_use]
pub fn line_views(cart: &Cart) -> Vec<CartLineView> {
    cart.lines()
        .iter()
        .enumerate()
        .map(|(index, line)| CartLineView {
            index,
            product_id: line.product_id.as_i32(),
            name: line.name.clone(),
            price: line.price.to_string(),
            image: line.image.clone(),
            quantity: line.quantity,
            line_total: line.line_total().to_string(),
        })
        .collect()
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub chrome: PageChrome,
    pub lines: Vec<CartLineView>,
    pub summary: CartSummary,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity change form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub delta: i32,
}

/// Display the cart page.
#[instrument(skip(session, user))]
pub async fn show(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> CartTemplate {
    let cart = load_cart(&session).await;
    CartTemplate {
        lines: line_views(&cart),
        summary: CartSummary::of(&cart),
        chrome: PageChrome {
            user,
            cart_count: cart.item_count(),
        },
        error: query.error_message(),
        success: query.success_message(),
    }
}

/// Add a product to the cart.
///
/// The product's current name, price and image are copied into the line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddForm>,
) -> Result<Redirect> {
    let quantity = form.quantity.clamp(1, MAX_ADD_QUANTITY);
    let Some(product) = state
        .catalog()
        .product(state.pool(), ProductId::new(form.product_id))
        .await?
    else {
        return Ok(Redirect::to("/cart?error=unknown_product"));
    };

    let item = CartProduct::from(&product);
    update_cart(&session, |cart| cart.add_quantity(item, quantity)).await?;
    tracing::debug!(product_id = form.product_id, quantity, "Added to cart");

    Ok(Redirect::to("/cart?success=added"))
}

/// Change a line's quantity by one unit.
#[instrument(skip(session))]
pub async fn change_quantity(
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<QuantityForm>,
) -> Result<Redirect> {
    if form.delta != 1 && form.delta != -1 {
        return Err(AppError::BadRequest("quantity delta must be 1 or -1".to_string()));
    }

    let outcome = update_cart(&session, |cart| {
        if index >= cart.lines().len() {
            None
        } else {
            Some(cart.change_quantity(index, form.delta))
        }
    })
    .await?;

    Ok(match outcome {
        Some(true) => Redirect::to("/cart?success=updated"),
        Some(false) => Redirect::to("/cart?error=min_quantity"),
        None => Redirect::to("/cart?error=missing_line"),
    })
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(index): Path<usize>) -> Result<Redirect> {
    let removed = update_cart(&session, |cart| cart.remove(index)).await?;
    Ok(match removed {
        Some(_) => Redirect::to("/cart?success=removed"),
        None => Redirect::to("/cart?error=missing_line"),
    })
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    update_cart(&session, Cart::clear).await?;
    Ok(Redirect::to("/cart?success=cleared"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, price: u32) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            name: format!("Halwa {id}"),
            price: Rupees::from_whole(price),
            image: None,
        }
    }

    #[test]
    fn test_summary_shows_remaining_for_free_shipping() {
        let mut cart = Cart::new();
        cart.add_quantity(product(1, 450), 2);
        cart.add(product(2, 380));

        let summary = CartSummary::of(&cart);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, "₹1,280");
        assert_eq!(summary.free_shipping_remaining.as_deref(), Some("₹219"));
    }

    #[test]
    fn test_summary_at_threshold_has_no_remaining() {
        let mut cart = Cart::new();
        cart.add(product(1, 1499));
        assert!(CartSummary::of(&cart).free_shipping_remaining.is_none());
    }

    #[test]
    fn test_line_views_carry_positions() {
        let mut cart = Cart::new();
        cart.add(product(1, 450));
        cart.add(product(2, 380));
        let views = line_views(&cart);
        assert_eq!(views.len(), 2);
        assert_eq!(views.get(1).unwrap().index, 1);
        assert_eq!(views.get(1).unwrap().product_id, 2);
    }
}
