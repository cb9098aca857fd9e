//! Order management: listing, detail, status changes and deletion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use halwa_core::{Order, OrderId, OrderStats, OrderStatus};

use super::{AdminChrome, MessageQuery, after_mutation, redirect_with};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const LIST_PATH: &str = "/orders";

/// `?status=&q=` on the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilterQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

impl OrderFilterQuery {
    /// Selected status; blank, `all` and unknown values mean no filter.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    /// Trimmed search text, `None` when blank.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// One row of the order table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub reference: String,
    pub placed_at: String,
    pub customer_name: String,
    pub customer_email: String,
    pub item_count: u32,
    pub total: String,
    pub status: &'static str,
    pub status_badge: &'static str,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            reference: order.reference(),
            placed_at: order.created_at.format("%-d %b %Y, %H:%M").to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            item_count: order.item_count(),
            total: order.totals.total.to_string(),
            status: order.status.label(),
            status_badge: order.status.badge_class(),
        }
    }
}

/// Line item on the detail page.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub image: Option<String>,
    pub line_total: String,
}

/// Everything the detail page shows.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub row: OrderRowView,
    pub customer_phone: String,
    pub address: String,
    pub city_line: String,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub shipping_fee: String,
    pub payment_method: &'static str,
    pub shipping_tier: &'static str,
    pub estimated_delivery: Option<String>,
    pub updated_at: String,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        let shipping = &order.shipping;
        Self {
            row: OrderRowView::from(order),
            customer_phone: order.customer_phone.clone(),
            address: shipping.address.clone(),
            city_line: format!("{}, {} {}", shipping.city, shipping.state, shipping.pincode),
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
            subtotal: order.totals.subtotal.to_string(),
            shipping_fee: order.totals.shipping_fee.to_string(),
            payment_method: order.payment_method.label(),
            shipping_tier: order.shipping_tier.label(),
            estimated_delivery: order
                .estimated_delivery
                .map(|d| d.format("%a, %-d %b %Y").to_string()),
            updated_at: order.updated_at.format("%-d %b %Y, %H:%M").to_string(),
        }
    }
}

/// Status tab with its order count.
#[derive(Debug, Clone)]
pub struct StatusCountView {
    /// Query value; empty for "All".
    pub value: &'static str,
    pub label: &'static str,
    pub count: u64,
    pub badge: &'static str,
    pub selected: bool,
}

/// "All" followed by one tab per status.
#[must_use]
pub fn status_counts(stats: &OrderStats, selected: Option<OrderStatus>) -> Vec<StatusCountView> {
    let all = StatusCountView {
        value: "",
        label: "All",
        count: stats.total,
        badge: "badge-neutral",
        selected: selected.is_none(),
    };
    std::iter::once(all)
        .chain(OrderStatus::ALL.into_iter().map(|status| StatusCountView {
            value: status.as_str(),
            label: status.label(),
            count: stats.count(status),
            badge: status.badge_class(),
            selected: selected == Some(status),
        }))
        .collect()
}

/// Option in the status select.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn status_options(current: OrderStatus) -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            label: status.label(),
            selected: status == current,
        })
        .collect()
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub chrome: AdminChrome,
    pub order_rows: Vec<OrderRowView>,
    pub tabs: Vec<StatusCountView>,
    pub status: &'static str,
    pub search: String,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub chrome: AdminChrome,
    pub order: OrderDetailView,
    pub statuses: Vec<StatusOption>,
}

/// Order listing, newest first.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilterQuery>,
    Query(messages): Query<MessageQuery>,
) -> Result<OrdersIndexTemplate> {
    let repo = OrderRepository::new(state.pool());
    let status = filter.status();
    let orders = repo.list(status, filter.search()).await?;
    let stats = repo.stats().await?;

    Ok(OrdersIndexTemplate {
        chrome: AdminChrome::new(&admin, LIST_PATH, &messages),
        order_rows: orders.iter().map(OrderRowView::from).collect(),
        tabs: status_counts(&stats, status),
        status: status.map_or("", OrderStatus::as_str),
        search: filter.search().unwrap_or_default().to_string(),
    })
}

/// Order detail page.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(messages): Query<MessageQuery>,
) -> Result<OrderShowTemplate> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderShowTemplate {
        chrome: AdminChrome::new(&admin, LIST_PATH, &messages),
        statuses: status_options(order.status),
        order: OrderDetailView::from(&order),
    })
}

/// Set an order's status.
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return Ok(redirect_with(LIST_PATH, "error", "invalid_status"));
    };

    let result = OrderRepository::new(state.pool())
        .set_status(OrderId::new(id), status)
        .await;
    if result.is_ok() {
        tracing::info!(order_id = id, status = %status, "Order status updated");
    }
    after_mutation(LIST_PATH, result, "status_updated")
}

/// Delete an order.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let result = OrderRepository::new(state.pool())
        .delete(OrderId::new(id))
        .await;
    if result.is_ok() {
        tracing::info!(order_id = id, "Order deleted");
    }
    after_mutation(LIST_PATH, result, "deleted")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_ignores_unknown_status_and_blank_search() {
        let query = OrderFilterQuery {
            status: Some("Shipped".to_string()),
            q: Some("   ".to_string()),
        };
        assert_eq!(query.status(), Some(OrderStatus::Shipped));
        assert_eq!(query.search(), None);

        let query = OrderFilterQuery {
            status: Some("all".to_string()),
            q: Some(" HD-000042 ".to_string()),
        };
        assert_eq!(query.status(), None);
        assert_eq!(query.search(), Some("HD-000042"));
    }

    #[test]
    fn test_status_counts_lead_with_all() {
        let stats: OrderStats = [
            OrderStatus::Pending,
            OrderStatus::Pending,
            OrderStatus::Delivered,
        ]
        .into_iter()
        .collect();

        let tabs = status_counts(&stats, Some(OrderStatus::Pending));
        assert_eq!(tabs.len(), OrderStatus::ALL.len() + 1);
        assert_eq!((tabs[0].label, tabs[0].count, tabs[0].selected), ("All", 3, false));

        let pending = tabs.iter().find(|t| t.value == "pending").map(|t| (t.count, t.selected));
        assert_eq!(pending, Some((2, true)));
    }

    #[test]
    fn test_status_options_mark_current() {
        let options = status_options(OrderStatus::Shipped);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["shipped"]);
    }
}
