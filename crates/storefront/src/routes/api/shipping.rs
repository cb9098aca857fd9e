//! Live shipping quote for the checkout page.

use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use halwa_core::{ShippingAddress, ShippingQuote, resolve_shipping, shop_today};

use crate::services::cart::load_cart;

/// Address fields as typed so far. Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

impl From<QuoteRequest> for ShippingAddress {
    fn from(req: QuoteRequest) -> Self {
        Self {
            address: req.address,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
        }
    }
}

/// Quote with display strings for the order summary.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub tier: &'static str,
    pub tier_label: &'static str,
    pub free_shipping: bool,
    pub eta_days: u32,
    /// `YYYY-MM-DD`
    pub eta_date: String,
    pub eta_display: String,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
}

impl QuoteResponse {
    /// Display form of `quote` for a cart worth `subtotal`.
    #[must_use]
    pub fn new(quote: &ShippingQuote, subtotal: halwa_core::Rupees) -> Self {
        let totals = halwa_core::OrderTotals::from_parts(subtotal, quote.fee);
        Self {
            tier: quote.tier.as_str(),
            tier_label: quote.tier.label(),
            free_shipping: quote.free_shipping,
            eta_days: quote.eta_days,
            eta_date: quote.eta_date.format("%Y-%m-%d").to_string(),
            eta_display: quote.eta_date.format("%a, %-d %b %Y").to_string(),
            subtotal: totals.subtotal.to_string(),
            shipping_fee: if quote.free_shipping {
                "FREE".to_string()
            } else {
                totals.shipping_fee.to_string()
            },
            total: totals.total.to_string(),
        }
    }
}

/// Quote shipping for the posted address and the session cart.
#[instrument(skip(session, request))]
pub async fn quote(session: Session, Json(request): Json<QuoteRequest>) -> Json<QuoteResponse> {
    let subtotal = load_cart(&session).await.subtotal();
    let address = ShippingAddress::from(request);
    let quote = resolve_shipping(&address.matching_text(), subtotal, shop_today(Utc::now()));
    tracing::debug!(tier = quote.tier.as_str(), "Shipping quoted");
    Json(QuoteResponse::new(&quote, subtotal))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use halwa_core::Rupees;

    use super::*;

    #[test]
    fn test_chennai_quote_display() {
        // Monday; three days later is a Thursday.
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let subtotal = Rupees::from_whole(1280);
        let quote = resolve_shipping("12 Anna Salai, Chennai", subtotal, today);

        let response = QuoteResponse::new(&quote, subtotal);
        assert_eq!(response.shipping_fee, "₹99");
        assert_eq!(response.total, "₹1,379");
        assert_eq!(response.eta_days, 3);
        assert_eq!(response.eta_date, "2024-06-06");
        assert!(!response.free_shipping);
    }

    #[test]
    fn test_free_shipping_display() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let subtotal = Rupees::from_whole(1500);
        let quote = resolve_shipping("Guwahati, Assam", subtotal, today);

        let response = QuoteResponse::new(&quote, subtotal);
        assert_eq!(response.shipping_fee, "FREE");
        assert_eq!(response.total, "₹1,500");
    }
}
