//! Halwa Delights Core - Shared types and storefront rules.
//!
//! This crate provides the domain vocabulary used across all Halwa Delights components:
//! - `storefront` - Public-facing shop (catalog, cart, checkout, accounts)
//! - `admin` - Store management console (offers, popular items, products, orders, feedback)
//! - `cli` - Command-line tools for migrations, seeding, and role assignment
//!
//! # Architecture
//!
//! The core crate contains types and pure functions only - no I/O, no database
//! access, no HTTP clients. The shipping resolver, cart arithmetic and checkout
//! validation live here so both binaries and the integration tests agree on them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, phone numbers, ratings and statuses
//! - [`shipping`] - Address-based shipping fee and delivery date resolver
//! - [`cart`] - Session cart lines and quantity rules
//! - [`order`] - Order snapshots, totals and checkout form validation
//! - [`catalog`] - Product, offer, popular item and feedback records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod shipping;
pub mod types;

pub use cart::{Cart, CartLine, CartProduct, MAX_LINE_QUANTITY};
pub use catalog::{Feedback, FeedbackSource, Offer, PopularItem, PriceBand, Product, ProductFilter};
pub use order::{
    CheckoutDraft, CheckoutError, CheckoutForm, Customer, FieldError, NewOrder, Order, OrderItem,
    OrderStats, OrderTotals, validate_checkout,
};
pub use shipping::{ShippingAddress, ShippingQuote, ShippingTier, resolve_shipping, shop_today};
pub use types::*;
