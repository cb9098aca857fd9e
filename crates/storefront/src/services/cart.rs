//! Session-backed cart storage.
//!
//! The cart lives in the session under [`session_keys::CART`]. Every
//! mutation writes the whole cart back before the response is sent.

use tower_sessions::Session;

use halwa_core::{Cart, OrderId};

use crate::models::session_keys;

/// Most recent order IDs remembered per session.
const PLACED_ORDERS_LIMIT: usize = 20;

/// Load the cart, treating a missing or unreadable value as empty.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable cart from session");
            Cart::new()
        }
    }
}

/// Persist the whole cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Load, mutate and save the cart in one step.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn update_cart<F, T>(session: &Session, f: F) -> Result<T, tower_sessions::session::Error>
where
    F: FnOnce(&mut Cart) -> T,
{
    let mut cart = load_cart(session).await;
    let result = f(&mut cart);
    save_cart(session, &cart).await?;
    Ok(result)
}

/// Remember that this session placed `order_id`.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_placed_order(
    session: &Session,
    order_id: OrderId,
) -> Result<(), tower_sessions::session::Error> {
    let mut placed = placed_orders(session).await;
    placed.retain(|id| *id != order_id);
    placed.push(order_id);
    if placed.len() > PLACED_ORDERS_LIMIT {
        placed.drain(..placed.len() - PLACED_ORDERS_LIMIT);
    }
    session.insert(session_keys::PLACED_ORDERS, placed).await
}

/// Orders placed from this session, oldest first.
pub async fn placed_orders(session: &Session) -> Vec<OrderId> {
    session
        .get::<Vec<OrderId>>(session_keys::PLACED_ORDERS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}
