//! JSON API endpoints used by page scripts.

pub mod cart;
pub mod shipping;
