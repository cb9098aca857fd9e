//! Rate limiting for form POSTs, using governor and `tower_governor`.
//!
//! - `auth`: login, registration and password reset (~10/min per IP)
//! - `checkout`: order placement, feedback and contact (~20/min per IP)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Client IP from the reverse proxy headers, falling back to the socket peer.
///
/// The storefront runs behind a proxy that sets `X-Forwarded-For`; the
/// leftmost entry is the client.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        header_ip(req, "x-forwarded-for")
            .or_else(|| header_ip(req, "x-real-ip"))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Governor rejected a limiter configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid rate limiter configuration: {0}")]
pub struct RateLimitConfigError(&'static str);

/// The storefront's rate limiters.
#[derive(Clone)]
pub struct RateLimiters {
    /// Login, registration and password reset.
    pub auth: RateLimiterLayer,
    /// Checkout, feedback and contact submissions.
    pub checkout: RateLimiterLayer,
}

impl RateLimiters {
    /// Build both limiters.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitConfigError` if governor rejects a configuration.
    pub fn new() -> Result<Self, RateLimitConfigError> {
        Ok(Self {
            // 1 token every 6 seconds, burst of 5
            auth: limiter(6, 5).ok_or(RateLimitConfigError("auth"))?,
            // 1 token every 3 seconds, burst of 10
            checkout: limiter(3, 10).ok_or(RateLimitConfigError("checkout"))?,
        })
    }
}

fn limiter(replenish_seconds: u64, burst: u32) -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_seconds)
        .burst_size(burst)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_forwarded_for_uses_leftmost() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("198.51.100.4:5000".parse::<SocketAddr>().unwrap()));
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }

    #[test]
    fn test_limiters_build() {
        assert!(RateLimiters::new().is_ok());
    }
}
