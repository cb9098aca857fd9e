//! JSON endpoints.
//!
//! Paths under `/api/` answer 401/403 instead of redirecting when the
//! caller is not a signed-in admin.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use halwa_core::OrderStats;

use crate::db::{DashboardCounts, DashboardRepository, OrderRepository};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/stats` body.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub records: DashboardCounts,
    pub orders: OrderStats,
}

/// Record counts and order counts per status.
#[instrument(skip(_admin, state))]
pub async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let records = DashboardRepository::new(state.pool()).counts().await?;
    let orders = OrderRepository::new(state.pool()).stats().await?;
    Ok(Json(StatsResponse { records, orders }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use halwa_core::OrderStatus;

    use super::*;

    #[test]
    fn test_stats_body_shape() {
        let body = StatsResponse {
            records: DashboardCounts {
                offers: 2,
                popular: 4,
                products: 12,
                feedbacks: 7,
            },
            orders: [OrderStatus::Pending, OrderStatus::Shipped].into_iter().collect(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["records"]["products"], 12);
        assert_eq!(json["orders"]["total"], 2);
        assert_eq!(json["orders"]["shipped"], 1);
    }
}
