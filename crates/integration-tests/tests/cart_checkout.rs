//! Cart to order: validation, server-side totals and the snapshot written
//! to the database.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;

use halwa_core::{
    CheckoutError, CheckoutForm, NewOrder, PaymentMethod, Rupees, ShippingTier, resolve_shipping,
    validate_checkout,
};
use halwa_integration_tests::{cart_with, product};

fn form() -> CheckoutForm {
    CheckoutForm {
        name: "Meena Krishnan".to_string(),
        email: "Meena.K@Gmail.com".to_string(),
        phone: "9876543210".to_string(),
        address: "12 North Car Street".to_string(),
        city: "Madurai".to_string(),
        state: "Tamil Nadu".to_string(),
        pincode: "625001".to_string(),
        payment_method: "cod".to_string(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn test_order_snapshots_cart_and_totals() {
    let cart = cart_with(&[
        (product(1, "Tirunelveli Halwa", 450), 2),
        (product(2, "Milk Halwa", 380), 1),
        (product(1, "Tirunelveli Halwa", 450), 1),
    ]);
    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.item_count(), 4);

    let draft = validate_checkout(&form()).unwrap();
    let quote = resolve_shipping(&draft.shipping.matching_text(), cart.subtotal(), today());
    let order = NewOrder::build(draft, &cart, &quote, None).unwrap();

    assert_eq!(order.shipping_tier, ShippingTier::MajorInState);
    assert_eq!(order.totals.subtotal, Rupees::from_whole(1730));
    assert_eq!(order.totals.shipping_fee, Rupees::ZERO);
    assert_eq!(order.totals.total, Rupees::from_whole(1730));
    assert_eq!(order.customer.email.as_str(), "meena.k@gmail.com");
    assert_eq!(order.payment_method, PaymentMethod::Cod);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].quantity, 3);
}

#[test]
fn test_small_order_pays_tier_fee() {
    let cart = cart_with(&[(product(5, "Carrot Halwa", 280), 1)]);
    let draft = validate_checkout(&form()).unwrap();
    let quote = resolve_shipping(&draft.shipping.matching_text(), cart.subtotal(), today());
    let order = NewOrder::build(draft, &cart, &quote, None).unwrap();

    assert_eq!(order.totals.shipping_fee, Rupees::from_whole(79));
    assert_eq!(order.totals.total, Rupees::from_whole(359));
}

#[test]
fn test_empty_cart_cannot_be_ordered() {
    let cart = cart_with(&[]);
    let draft = validate_checkout(&form()).unwrap();
    let quote = resolve_shipping("Madurai", cart.subtotal(), today());

    assert_eq!(
        NewOrder::build(draft, &cart, &quote, None),
        Err(CheckoutError::EmptyCart)
    );
}

#[test]
fn test_every_bad_field_is_reported() {
    let bad = CheckoutForm {
        name: " ".to_string(),
        email: "not-an-email".to_string(),
        phone: "12345".to_string(),
        pincode: "012345".to_string(),
        payment_method: "cheque".to_string(),
        ..form()
    };

    let fields: Vec<_> = validate_checkout(&bad)
        .unwrap_err()
        .into_iter()
        .map(|e| e.field)
        .collect();
    assert_eq!(
        fields,
        vec!["name", "email", "phone", "pincode", "payment_method"]
    );
}
