//! Request ID middleware for log and error correlation.
//!
//! An upstream `x-request-id` is kept when it looks sane (short, printable
//! ASCII); otherwise a UUID v4 is generated. The ID is recorded on the
//! current span, tagged on the Sentry scope and echoed in the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID accepted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

fn upstream_id(request: &Request) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let acceptable = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    acceptable.then(|| value.to_owned())
}

/// Ensure every request carries an ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = upstream_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_upstream_id_kept_when_sane() {
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "cf-7f3a2b")
            .body(Body::empty())
            .unwrap();
        assert_eq!(upstream_id(&req).as_deref(), Some("cf-7f3a2b"));
    }

    #[test]
    fn test_upstream_id_rejected_when_oversized_or_spaced() {
        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, long)
            .body(Body::empty())
            .unwrap();
        assert!(upstream_id(&req).is_none());

        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "two words")
            .body(Body::empty())
            .unwrap();
        assert!(upstream_id(&req).is_none());
    }
}
