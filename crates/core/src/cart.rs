//! Shopping cart lines and quantity rules.
//!
//! A cart is an ordered list of [`CartLine`]s. Product fields are copied into
//! the line when it is added and are not refreshed if the product changes
//! later. Lines are addressed by position, matching how the cart page renders
//! them.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{ProductId, Rupees};

/// Most units a single line can hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One product in the cart with a snapshot of its catalog fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Rupees,
    pub image: Option<String>,
    /// Between 1 and [`MAX_LINE_QUANTITY`].
    pub quantity: u32,
}

impl CartLine {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Rupees {
        self.price * self.quantity
    }
}

/// The fields a cart needs from a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Rupees,
    pub image: Option<String>,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image_url.clone(),
        }
    }
}

/// A shopper's cart.
///
/// Serializes as a plain JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product`, merging with an existing line for the same id.
    pub fn add(&mut self, product: CartProduct) {
        self.add_quantity(product, 1);
    }

    /// Add `quantity` units of `product`, merging by id.
    ///
    /// A zero quantity is ignored. The line is capped at [`MAX_LINE_QUANTITY`].
    pub fn add_quantity(&mut self, product: CartProduct, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
            return;
        }
        let quantity = quantity.min(MAX_LINE_QUANTITY);
        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name,
            price: product.price,
            image: product.image,
            quantity,
        });
    }

    /// Adjust the quantity of the line at `index` by `delta`.
    ///
    /// Returns `false` and leaves the cart untouched when the index is out of
    /// range or the new quantity would leave `1..=MAX_LINE_QUANTITY`. Removing
    /// a line is a separate operation.
    pub fn change_quantity(&mut self, index: usize, delta: i32) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        let next = i64::from(line.quantity) + i64::from(delta);
        match u32::try_from(next) {
            Ok(quantity) if (1..=MAX_LINE_QUANTITY).contains(&quantity) => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove the line at `index`.
    pub fn remove(&mut self, index: usize) -> Option<CartLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Rupees {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn halwa(id: i32, price: u32) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            name: format!("Halwa {id}"),
            price: Rupees::from_whole(price),
            image: None,
        }
    }

    #[test]
    fn test_add_same_product_twice_merges() {
        let mut cart = Cart::new();
        cart.add(halwa(1, 450));
        cart.add(halwa(1, 450));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().unwrap().quantity, 2);
    }

    #[test]
    fn test_add_keeps_first_snapshot() {
        let mut cart = Cart::new();
        cart.add(halwa(1, 450));
        cart.add(halwa(1, 500));
        assert_eq!(cart.lines().first().unwrap().price, Rupees::from_whole(450));
    }

    #[test]
    fn test_change_quantity_never_below_one() {
        let mut cart = Cart::new();
        cart.add(halwa(1, 450));
        assert!(!cart.change_quantity(0, -1));
        assert!(!cart.change_quantity(0, -5));
        assert_eq!(cart.lines().first().unwrap().quantity, 1);

        assert!(cart.change_quantity(0, 2));
        assert!(cart.change_quantity(0, -1));
        assert_eq!(cart.lines().first().unwrap().quantity, 2);
    }

    #[test]
    fn test_line_quantity_is_capped() {
        let mut cart = Cart::new();
        cart.add_quantity(halwa(1, 450), 50);
        cart.add_quantity(halwa(1, 450), 50);
        assert_eq!(cart.lines().first().unwrap().quantity, MAX_LINE_QUANTITY);
        assert!(!cart.change_quantity(0, 1));
        assert_eq!(cart.lines().first().unwrap().quantity, MAX_LINE_QUANTITY);

        cart.add_quantity(halwa(2, 380), 500);
        assert_eq!(cart.lines().get(1).unwrap().quantity, MAX_LINE_QUANTITY);
        assert!(cart.change_quantity(1, -1));
    }

    #[test]
    fn test_change_quantity_out_of_range() {
        let mut cart = Cart::new();
        assert!(!cart.change_quantity(3, 1));
    }

    #[test]
    fn test_remove_is_unconditional() {
        let mut cart = Cart::new();
        cart.add(halwa(1, 450));
        cart.add(halwa(2, 380));
        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.product_id, ProductId::new(1));
        assert_eq!(cart.lines().len(), 1);
        assert!(cart.remove(5).is_none());
    }

    #[test]
    fn test_subtotal_and_count() {
        let mut cart = Cart::new();
        cart.add_quantity(halwa(1, 450), 2);
        cart.add(halwa(2, 380));
        assert_eq!(cart.subtotal(), Rupees::from_whole(1280));
        assert_eq!(cart.item_count(), 3);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Rupees::ZERO);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut cart = Cart::new();
        cart.add(halwa(7, 380));
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
