//! The uniform response envelope.
//!
//! Every response leaving the service — success, error, and CORS
//! pre-flight — carries the same fixed header set so browser clients see a
//! consistent contract. The middleware also short-circuits `OPTIONS`
//! pre-flight requests with an empty 200 before auth or routing runs.

use axum::extract::Request;
use axum::http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Apply the fixed envelope headers to a response header map.
pub fn apply_envelope_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type, Authorization, X-Api-Key, X-Access-Key"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
}

/// Envelope middleware: short-circuit pre-flight, then stamp the envelope
/// headers onto whatever the inner service produced.
pub async fn envelope_middleware(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        apply_envelope_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(req).await;
    apply_envelope_headers(response.headers_mut());
    response
}
