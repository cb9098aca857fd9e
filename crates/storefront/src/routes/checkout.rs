//! Checkout route handlers.
//!
//! Placing an order is all-or-nothing: the form is validated, totals are
//! recomputed from the session cart and the shipping resolver, and one row
//! is written. The cart is cleared only after the write succeeds.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use halwa_core::{
    Cart, CheckoutForm, FieldError, NewOrder, PaymentMethod, resolve_shipping, shop_today,
    validate_checkout,
};

use super::PageChrome;
use super::api::shipping::QuoteResponse;
use super::cart::{CartLineView, line_views};
use crate::db::{OrderRepository, UserRepository};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::services::cart::{load_cart, remember_placed_order, save_cart};
use crate::state::AppState;

/// Payment method radio option.
#[derive(Debug, Clone)]
pub struct PaymentOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub chrome: PageChrome,
    pub form: CheckoutForm,
    pub lines: Vec<CartLineView>,
    pub quote: QuoteResponse,
    pub payment_options: Vec<PaymentOption>,
    pub errors: Vec<FieldError>,
    /// Shown when the order could not be saved.
    pub store_error: Option<String>,
}

impl CheckoutTemplate {
    /// Inline error for one form field.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Assemble the page for `form` and the current cart.
fn checkout_page(
    user: Option<CurrentUser>,
    cart: &Cart,
    form: CheckoutForm,
    errors: Vec<FieldError>,
    store_error: Option<String>,
) -> CheckoutTemplate {
    let subtotal = cart.subtotal();
    let quote = resolve_shipping(
        &form.shipping_address().matching_text(),
        subtotal,
        shop_today(Utc::now()),
    );
    let payment_options = PaymentMethod::ALL
        .into_iter()
        .map(|method| PaymentOption {
            value: method.as_str(),
            label: method.label(),
            selected: form.payment_method.eq_ignore_ascii_case(method.as_str()),
        })
        .collect();

    CheckoutTemplate {
        chrome: PageChrome {
            user,
            cart_count: cart.item_count(),
        },
        lines: line_views(cart),
        quote: QuoteResponse::new(&quote, subtotal),
        payment_options,
        form,
        errors,
        store_error,
    }
}

/// Display the checkout form.
///
/// Signed-in customers get their name, email and mobile prefilled.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let mut form = CheckoutForm::default();
    if let Some(current) = &user
        && let Some(account) = UserRepository::new(state.pool()).get_by_id(current.id).await?
    {
        form.name = account.username;
        form.email = account.email.into_inner();
        form.phone = account.mobile.as_str().to_owned();
    }

    Ok(checkout_page(user, &cart, form, Vec::new(), None).into_response())
}

/// Validate the form and place the order.
#[instrument(skip(state, session, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let draft = match validate_checkout(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(invalid_fields = errors.len(), "Checkout validation failed");
            return Ok(checkout_page(user, &cart, form, errors, None).into_response());
        }
    };

    let quote = resolve_shipping(
        &draft.shipping.matching_text(),
        cart.subtotal(),
        shop_today(Utc::now()),
    );
    let Ok(new_order) = NewOrder::build(draft, &cart, &quote, user.as_ref().map(|u| u.id)) else {
        return Ok(Redirect::to("/cart").into_response());
    };

    let orders = OrderRepository::new(state.pool());
    let order_id = match orders.create(&new_order).await {
        Ok(id) => id,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to save order");
            let message =
                "We couldn't place your order just now. Your cart is unchanged, please try again."
                    .to_string();
            return Ok(checkout_page(user, &cart, form, Vec::new(), Some(message)).into_response());
        }
    };

    tracing::info!(
        order_id = %order_id,
        tier = new_order.shipping_tier.as_str(),
        total = %new_order.totals.total,
        "Order placed"
    );
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", &order_id.to_string())]));

    save_cart(&session, &Cart::new()).await?;
    remember_placed_order(&session, order_id).await?;

    if let Some(email) = state.email() {
        match orders.get(order_id).await {
            Ok(Some(order)) => {
                let order_url = state
                    .config()
                    .absolute_url(&format!("/orders/{order_id}/confirmation"));
                if let Err(e) = email.send_order_confirmation(&order, &order_url).await {
                    tracing::error!(error = %e, order_id = %order_id, "Failed to send order confirmation");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, order_id = %order_id, "Failed to reload order for email");
            }
        }
    }

    Ok(Redirect::to(&format!("/orders/{order_id}/confirmation")).into_response())
}
