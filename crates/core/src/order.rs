//! Orders, totals and checkout validation.
//!
//! Checkout turns three inputs into one order snapshot: the session cart,
//! the submitted form and a shipping quote. [`validate_checkout`] checks the
//! form, [`NewOrder::build`] copies the cart lines and computes totals. The
//! totals are always derived here, never taken from the client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::shipping::{ShippingAddress, ShippingQuote, ShippingTier};
use crate::types::{
    Email, MobileNumber, OrderId, OrderStatus, PaymentMethod, ProductId, Rupees, UserId,
};

/// A line item copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: Rupees,
    pub quantity: u32,
    pub image: Option<String>,
    /// Catalog id at the time of purchase, used for reorders.
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

impl OrderItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Rupees {
        self.price * self.quantity
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
            image: line.image.clone(),
            product_id: Some(line.product_id),
        }
    }
}

/// Subtotal, shipping fee and grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Rupees,
    pub shipping_fee: Rupees,
    pub total: Rupees,
}

impl OrderTotals {
    /// Totals for `cart` shipped with `quote`.
    #[must_use]
    pub fn compute(cart: &Cart, quote: &ShippingQuote) -> Self {
        Self::from_parts(cart.subtotal(), quote.fee)
    }

    /// Totals from a subtotal and fee.
    #[must_use]
    pub fn from_parts(subtotal: Rupees, shipping_fee: Rupees) -> Self {
        Self {
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

/// Who placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: Email,
    pub phone: MobileNumber,
}

/// Raw checkout form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub payment_method: String,
}

impl CheckoutForm {
    /// The delivery part of the form.
    #[must_use]
    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            pincode: self.pincode.trim().to_owned(),
        }
    }
}

/// One invalid form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDraft {
    pub customer: Customer,
    pub shipping: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Validate every field, collecting all problems rather than stopping at the first.
///
/// # Errors
///
/// Returns one [`FieldError`] per invalid field.
pub fn validate_checkout(form: &CheckoutForm) -> Result<CheckoutDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = form.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Please enter your name"));
    }

    let email = Email::parse(&form.email)
        .map_err(|_| errors.push(FieldError::new("email", "Please enter a valid email address")))
        .ok();

    let phone = MobileNumber::parse(&form.phone)
        .map_err(|_| {
            errors.push(FieldError::new(
                "phone",
                "Please enter a valid 10-digit phone number",
            ));
        })
        .ok();

    let shipping = form.shipping_address();
    for (field, value, label) in [
        ("address", &shipping.address, "address"),
        ("city", &shipping.city, "city"),
        ("state", &shipping.state, "state"),
    ] {
        if value.is_empty() {
            errors.push(FieldError::new(field, format!("Please enter your {label}")));
        }
    }

    if !is_valid_pincode(&shipping.pincode) {
        errors.push(FieldError::new("pincode", "Please enter a valid 6-digit PIN code"));
    }

    let payment_method = form
        .payment_method
        .parse::<PaymentMethod>()
        .map_err(|_| errors.push(FieldError::new("payment_method", "Please select a payment method")))
        .ok();

    match (email, phone, payment_method) {
        (Some(email), Some(phone), Some(payment_method)) if errors.is_empty() => Ok(CheckoutDraft {
            customer: Customer {
                name: name.to_owned(),
                email,
                phone,
            },
            shipping,
            payment_method,
        }),
        _ => Err(errors),
    }
}

/// Six digits, not starting with zero.
#[must_use]
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6
        && pincode.bytes().all(|b| b.is_ascii_digit())
        && !pincode.starts_with('0')
}

/// Why an order could not be assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("your cart is empty")]
    EmptyCart,
}

/// An order ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub customer: Customer,
    pub shipping: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
    pub payment_method: PaymentMethod,
    pub shipping_tier: ShippingTier,
    pub estimated_delivery: NaiveDate,
}

impl NewOrder {
    /// Snapshot `cart` into an order priced with `quote`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the cart has no lines.
    pub fn build(
        draft: CheckoutDraft,
        cart: &Cart,
        quote: &ShippingQuote,
        user_id: Option<UserId>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            user_id,
            customer: draft.customer,
            shipping: draft.shipping,
            items: cart.lines().iter().map(OrderItem::from).collect(),
            totals: OrderTotals::compute(cart, quote),
            payment_method: draft.payment_method,
            shipping_tier: quote.tier,
            estimated_delivery: quote.eta_date,
        })
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub shipping_tier: ShippingTier,
    pub estimated_delivery: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Customer-facing order reference, e.g. `HD-001042`.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("HD-{:06}", self.id.as_i32())
    }

    /// Only delivered orders can be ordered again.
    #[must_use]
    pub fn can_reorder(&self) -> bool {
        self.status == OrderStatus::Delivered
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Case-insensitive match on reference, id, customer name or email.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.reference().to_lowercase().contains(&needle)
            || self.id.to_string() == needle
            || self.customer_name.to_lowercase().contains(&needle)
            || self.customer_email.to_lowercase().contains(&needle)
    }
}

/// Columns selected for an [`OrderRecord`].
#[cfg(feature = "postgres")]
pub const ORDER_COLUMNS: &str = "id, user_id, customer_name, customer_email, customer_phone, \
     shipping_address, shipping_city, shipping_state, shipping_pincode, items, \
     subtotal, shipping_fee, total, payment_method, status, shipping_tier, \
     estimated_delivery, created_at, updated_at";

/// One `orders` row as stored.
#[cfg(feature = "postgres")]
#[derive(Debug, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_pincode: String,
    pub items: sqlx::types::Json<Vec<OrderItem>>,
    pub subtotal: Rupees,
    pub shipping_fee: Rupees,
    pub total: Rupees,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub shipping_tier: String,
    pub estimated_delivery: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "postgres")]
impl TryFrom<OrderRecord> for Order {
    type Error = String;

    fn try_from(row: OrderRecord) -> Result<Self, Self::Error> {
        let shipping_tier = row.shipping_tier.parse::<ShippingTier>()?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            shipping: ShippingAddress {
                address: row.shipping_address,
                city: row.shipping_city,
                state: row.shipping_state,
                pincode: row.shipping_pincode,
            },
            items: row.items.0,
            totals: OrderTotals {
                subtotal: row.subtotal,
                shipping_fee: row.shipping_fee,
                total: row.total,
            },
            payment_method: row.payment_method,
            status: row.status,
            shipping_tier,
            estimated_delivery: row.estimated_delivery,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Order counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

impl OrderStats {
    /// Add `count` orders with `status`.
    pub const fn record(&mut self, status: OrderStatus, count: u64) {
        self.total += count;
        match status {
            OrderStatus::Pending => self.pending += count,
            OrderStatus::Confirmed => self.confirmed += count,
            OrderStatus::Shipped => self.shipped += count,
            OrderStatus::Delivered => self.delivered += count,
            OrderStatus::Cancelled => self.cancelled += count,
        }
    }

    /// Count for one status.
    #[must_use]
    pub const fn count(&self, status: OrderStatus) -> u64 {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Confirmed => self.confirmed,
            OrderStatus::Shipped => self.shipped,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
        }
    }
}

impl FromIterator<OrderStatus> for OrderStats {
    fn from_iter<I: IntoIterator<Item = OrderStatus>>(iter: I) -> Self {
        let mut stats = Self::default();
        for status in iter {
            stats.record(status, 1);
        }
        stats
    }
}
