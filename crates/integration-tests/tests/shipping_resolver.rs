//! Shipping quotes as the checkout page sees them: structured address in,
//! tier, fee and delivery date out.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;

use halwa_core::{Rupees, ShippingAddress, ShippingTier, resolve_shipping};

fn address(address: &str, city: &str, state: &str, pincode: &str) -> String {
    ShippingAddress {
        address: address.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        pincode: pincode.to_string(),
    }
    .matching_text()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Monday
const TODAY: (i32, u32, u32) = (2026, 10, 19);

fn today() -> NaiveDate {
    date(TODAY.0, TODAY.1, TODAY.2)
}

#[test]
fn test_city_beats_state_in_table_order() {
    let text = address("12 North Car Street", "Tirunelveli", "Tamil Nadu", "627001");
    let quote = resolve_shipping(&text, Rupees::from_whole(450), today());

    assert_eq!(quote.tier, ShippingTier::Local);
    assert_eq!(quote.fee, Rupees::ZERO);
    assert_eq!(quote.eta_date, date(2026, 10, 20));
}

#[test]
fn test_neighbouring_metro_before_neighbouring_state() {
    let text = address("4th Cross, Indiranagar", "Bengaluru", "Karnataka", "560038");
    let quote = resolve_shipping(&text, Rupees::from_whole(520), today());

    assert_eq!(quote.tier, ShippingTier::NeighboringMetro);
    assert_eq!(quote.fee, Rupees::from_whole(149));
    assert!(!quote.free_shipping);
}

#[test]
fn test_unknown_address_gets_default_rate() {
    let text = address("Flat 2B", "Springfield", "", "999999");
    let quote = resolve_shipping(&text, Rupees::from_whole(280), today());

    assert_eq!(quote.tier, ShippingTier::Default);
    assert_eq!(quote.fee, Rupees::from_whole(249));
}

#[test]
fn test_free_shipping_at_threshold_keeps_tier_and_eta() {
    let text = address("Marine Drive", "Mumbai", "Maharashtra", "400020");

    let below = resolve_shipping(&text, Rupees::from_whole(1498), today());
    assert_eq!(below.fee, Rupees::from_whole(199));

    let at = resolve_shipping(&text, Rupees::from_whole(1499), today());
    assert!(at.free_shipping);
    assert_eq!(at.fee, Rupees::ZERO);
    assert_eq!(at.tier, ShippingTier::DistantMetro);
    assert_eq!(at.eta_date, below.eta_date);
}

#[test]
fn test_weekend_arrivals_move_to_monday() {
    let chennai = address("Anna Nagar", "Chennai", "Tamil Nadu", "600040");

    // Thursday + 3 days lands on Sunday.
    let quote = resolve_shipping(&chennai, Rupees::from_whole(380), date(2026, 10, 22));
    assert_eq!(quote.eta_date, date(2026, 10, 26));

    // Friday + 1 day lands on Saturday.
    let local = address("", "Palayamkottai", "", "");
    let quote = resolve_shipping(&local, Rupees::from_whole(380), date(2026, 10, 23));
    assert_eq!(quote.eta_date, date(2026, 10, 26));
}
