//! Live tests for the admin console's access gate.
//!
//! These tests require:
//! - The admin console running (`cargo run -p halwa-admin`)
//! - For the signed-in test, `ADMIN_TEST_EMAIL` and `ADMIN_TEST_PASSWORD`
//!   for an account granted admin with `halwa-cli user grant-admin`
//!
//! Run with: `cargo test -p halwa-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{StatusCode, header};
use serde_json::Value;

use halwa_integration_tests::{admin_url, session_client};

#[tokio::test]
#[ignore = "Requires running admin console"]
async fn test_pages_redirect_to_login() {
    let client = session_client().unwrap();
    let base = admin_url();

    for path in ["/", "/orders", "/products", "/offers", "/popular", "/feedbacks"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert!(resp.status().is_redirection(), "{path}");
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/auth/login");
    }
}

#[tokio::test]
#[ignore = "Requires running admin console"]
async fn test_api_is_unauthorized_without_session() {
    let client = session_client().unwrap();
    let resp = client
        .get(format!("{}/api/stats", admin_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin console"]
async fn test_wrong_password_is_rejected() {
    let client = session_client().unwrap();
    let resp = client
        .post(format!("{}/auth/login", admin_url()))
        .form(&[("email", "nobody@halwadelights.in"), ("password", "wrong-password")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin console and ADMIN_TEST_EMAIL/ADMIN_TEST_PASSWORD"]
async fn test_admin_session_reaches_stats() {
    let email = std::env::var("ADMIN_TEST_EMAIL").unwrap();
    let password = std::env::var("ADMIN_TEST_PASSWORD").unwrap();
    let client = session_client().unwrap();
    let base = admin_url();

    let resp = client
        .post(format!("{base}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());

    let stats: Value = client
        .get(format!("{base}/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(stats["orders"]["total"].is_u64());
    assert!(stats["records"]["products"].is_u64());

    let resp = client
        .post(format!("{base}/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/auth/login?success=logged_out"
    );
}
