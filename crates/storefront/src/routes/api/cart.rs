//! Cart badge endpoint.

use axum::Json;
use serde::Serialize;
use tower_sessions::Session;

use crate::services::cart::load_cart;

/// Response body for `GET /api/cart/count`.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Number of units in the session cart.
pub async fn count(session: Session) -> Json<CartCount> {
    Json(CartCount {
        count: load_cart(&session).await.item_count(),
    })
}
