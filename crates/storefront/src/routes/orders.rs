//! Order confirmation, history and reorder handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use halwa_core::{CartProduct, Order, OrderId, OrderStatus};

use super::{MessageQuery, PageChrome};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::services::cart::{placed_orders, update_cart};
use crate::state::AppState;

/// Line item display data.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub image: Option<String>,
    pub line_total: String,
}

/// Order display data.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub reference: String,
    pub placed_on: String,
    pub status: &'static str,
    pub status_badge: &'static str,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub address_lines: Vec<String>,
    pub items: Vec<OrderItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
    pub payment_method: &'static str,
    pub shipping_tier: &'static str,
    pub estimated_delivery: Option<String>,
    pub can_reorder: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let shipping = &order.shipping;
        Self {
            id: order.id.as_i32(),
            reference: order.reference(),
            placed_on: order.created_at.format("%-d %b %Y").to_string(),
            status: order.status.label(),
            status_badge: order.status.badge_class(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            address_lines: vec![
                shipping.address.clone(),
                format!("{}, {} {}", shipping.city, shipping.state, shipping.pincode),
            ],
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    price: item.price.to_string(),
                    quantity: item.quantity,
                    image: item.image.clone(),
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            item_count: order.item_count(),
            subtotal: order.totals.subtotal.to_string(),
            shipping_fee: if order.totals.shipping_fee.is_zero() {
                "FREE".to_string()
            } else {
                order.totals.shipping_fee.to_string()
            },
            total: order.totals.total.to_string(),
            payment_method: order.payment_method.label(),
            shipping_tier: order.shipping_tier.label(),
            estimated_delivery: order
                .estimated_delivery
                .map(|d| d.format("%a, %-d %b %Y").to_string()),
            can_reorder: order.can_reorder(),
        }
    }
}

/// Status filter link.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct ConfirmationTemplate {
    pub chrome: PageChrome,
    pub order: OrderView,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrderHistoryTemplate {
    pub chrome: PageChrome,
    pub orders: Vec<OrderView>,
    pub statuses: Vec<StatusOption>,
    pub filtered: bool,
    pub error: Option<&'static str>,
}

/// `?status=` filter. Blank or unknown values show every order.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub error: Option<String>,
}

/// Whether `user` owns `order`, by account link or by email.
fn is_owner(order: &Order, user: &CurrentUser) -> bool {
    order.user_id == Some(user.id)
        || order
            .customer_email
            .eq_ignore_ascii_case(user.email.as_str())
}

/// Load an order the signed-in user owns, or 404.
async fn owned_order(state: &AppState, id: i32, user: &CurrentUser) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .filter(|order| is_owner(order, user))
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// Display the confirmation for a just-placed order.
///
/// Visible to the session that placed it and to the signed-in owner. Anyone
/// else gets a 404 so order ids cannot be enumerated.
#[instrument(skip(state, session, user))]
pub async fn confirmation(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i32>,
) -> Result<ConfirmationTemplate> {
    let order_id = OrderId::new(id);
    let placed_here = placed_orders(&session).await.contains(&order_id);

    let order = OrderRepository::new(state.pool())
        .get(order_id)
        .await?
        .filter(|order| placed_here || user.as_ref().is_some_and(|u| is_owner(order, u)))
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(ConfirmationTemplate {
        chrome: PageChrome::load(&session, user).await,
        order: OrderView::from(&order),
    })
}

/// Display the signed-in customer's orders, newest first.
#[instrument(skip(state, session, user))]
pub async fn history(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<HistoryQuery>,
) -> Result<OrderHistoryTemplate> {
    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<OrderStatus>().ok());

    let orders = OrderRepository::new(state.pool())
        .list_for_customer(user.id, &user.email, status)
        .await?;

    let statuses = OrderStatus::ALL
        .into_iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
            selected: status == Some(s),
        })
        .collect();

    Ok(OrderHistoryTemplate {
        chrome: PageChrome::load(&session, Some(user)).await,
        orders: orders.iter().map(OrderView::from).collect(),
        statuses,
        filtered: status.is_some(),
        error: MessageQuery {
            error: query.error,
            success: None,
        }
        .error_message(),
    })
}

/// Copy a delivered order's items into the cart.
///
/// Items are re-priced from the current catalog. Items whose product no
/// longer exists are skipped.
#[instrument(skip(state, session, user))]
pub async fn reorder(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let order = owned_order(&state, id, &user).await?;
    if !order.can_reorder() {
        return Ok(Redirect::to("/account/orders?error=reorder_not_delivered"));
    }

    let mut available = Vec::with_capacity(order.items.len());
    for item in &order.items {
        let Some(product_id) = item.product_id else {
            continue;
        };
        if let Some(product) = state.catalog().product(state.pool(), product_id).await? {
            available.push((CartProduct::from(&product), item.quantity));
        }
    }

    let skipped = order.items.len() - available.len();
    if available.is_empty() {
        return Ok(Redirect::to("/account/orders?error=reorder_empty"));
    }

    update_cart(&session, |cart| {
        for (product, quantity) in available {
            cart.add_quantity(product, quantity);
        }
    })
    .await?;

    tracing::info!(order_id = id, skipped, "Reordered into cart");

    Ok(if skipped == 0 {
        Redirect::to("/cart?success=reordered")
    } else {
        Redirect::to("/cart?success=reordered_partial")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use halwa_core::{
        Email, OrderItem, OrderTotals, PaymentMethod, Rupees, ShippingAddress, ShippingTier,
        UserId,
    };

    use super::*;

    fn order(user_id: Option<i32>, email: &str) -> Order {
        Order {
            id: OrderId::new(7),
            user_id: user_id.map(UserId::new),
            customer_name: "Meena".to_string(),
            customer_email: email.to_string(),
            customer_phone: "9876543210".to_string(),
            shipping: ShippingAddress {
                address: "12 Anna Salai".to_string(),
                city: "Chennai".to_string(),
                state: "Tamil Nadu".to_string(),
                pincode: "600002".to_string(),
            },
            items: vec![OrderItem {
                name: "Tirunelveli Halwa".to_string(),
                price: Rupees::from_whole(450),
                quantity: 2,
                image: None,
                product_id: None,
            }],
            totals: OrderTotals::from_parts(Rupees::from_whole(900), Rupees::from_whole(99)),
            payment_method: PaymentMethod::Cod,
            status: OrderStatus::Pending,
            shipping_tier: ShippingTier::Metro,
            estimated_delivery: NaiveDate::from_ymd_opt(2024, 6, 6),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: i32, email: &str) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            email: Email::parse(email).unwrap(),
            username: "Meena".to_string(),
        }
    }

    #[test]
    fn test_owner_by_account_or_email() {
        let linked = order(Some(3), "meena@example.in");
        assert!(is_owner(&linked, &user(3, "other@example.in")));

        let guest = order(None, "Meena@Example.in");
        assert!(is_owner(&guest, &user(9, "meena@example.in")));
        assert!(!is_owner(&guest, &user(9, "someone@example.in")));
    }

    #[test]
    fn test_only_delivered_orders_offer_reorder() {
        let mut placed = order(None, "meena@example.in");
        assert!(!OrderView::from(&placed).can_reorder);

        placed.status = OrderStatus::Delivered;
        assert!(OrderView::from(&placed).can_reorder);
    }

    #[test]
    fn test_order_view_formats_totals() {
        let view = OrderView::from(&order(None, "meena@example.in"));
        assert_eq!(view.reference, "HD-000007");
        assert_eq!(view.total, "₹999");
        assert_eq!(view.item_count, 2);
        assert_eq!(view.estimated_delivery.as_deref(), Some("Thu, 6 Jun 2024"));
        assert_eq!(view.address_lines.get(1).unwrap(), "Chennai, Tamil Nadu 600002");
    }
}
