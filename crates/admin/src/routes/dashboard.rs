//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tracing::instrument;

use super::orders::{OrderRowView, StatusCountView, status_counts};
use super::{AdminChrome, MessageQuery};
use crate::db::{DashboardCounts, DashboardRepository, OrderRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Orders shown in the "Recent orders" table.
const RECENT_ORDERS: i64 = 5;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: AdminChrome,
    pub counts: DashboardCounts,
    pub order_stats: Vec<StatusCountView>,
    pub order_rows: Vec<OrderRowView>,
}

/// Display the dashboard.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(messages): Query<MessageQuery>,
) -> Result<DashboardTemplate> {
    let counts = DashboardRepository::new(state.pool()).counts().await?;
    let orders = OrderRepository::new(state.pool());
    let stats = orders.stats().await?;
    let recent = orders.recent(RECENT_ORDERS).await?;

    Ok(DashboardTemplate {
        chrome: AdminChrome::new(&admin, "/", &messages),
        counts,
        order_stats: status_counts(&stats, None),
        order_rows: recent.iter().map(OrderRowView::from).collect(),
    })
}
