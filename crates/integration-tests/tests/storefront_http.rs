//! Live tests against a running storefront.
//!
//! These tests require:
//! - A migrated and seeded database (`halwa-cli migrate && halwa-cli seed`)
//! - The storefront running (`cargo run -p halwa-storefront`)
//!
//! Run with: `cargo test -p halwa-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{StatusCode, header};
use serde_json::{Value, json};

use halwa_integration_tests::{session_client, storefront_url};

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_health_and_readiness() {
    let client = session_client().unwrap();
    let base = storefront_url();

    for path in ["/health", "/health/ready"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_cart_badge_follows_session() {
    let client = session_client().unwrap();
    let base = storefront_url();

    let count: Value = client
        .get(format!("{base}/api/cart/count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 0);

    let resp = client
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", "1"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());

    let count: Value = client
        .get(format!("{base}/api/cart/count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_shipping_quote_for_empty_cart() {
    let client = session_client().unwrap();
    let quote: Value = client
        .post(format!("{}/api/shipping/quote", storefront_url()))
        .json(&json!({ "city": "Chennai", "state": "Tamil Nadu" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(quote["tier"], "metro");
    assert_eq!(quote["free_shipping"], false);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_account_requires_login() {
    let client = session_client().unwrap();
    let resp = client
        .get(format!("{}/account", storefront_url()))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_redirection());
    let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("/auth/login"));
}
