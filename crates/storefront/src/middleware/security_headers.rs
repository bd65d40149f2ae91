//! Security headers middleware.
//!
//! Adds restrictive security headers to all responses. Product images are
//! served by the commerce backend on another origin, so `img-src` allows
//! remote HTTP(S) sources; everything else stays same-origin.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    },
    middleware::Next,
    response::Response,
};

const CSP: &str = "default-src 'none'; \
    style-src 'self'; \
    img-src 'self' https: http:; \
    form-action 'self'; \
    base-uri 'self'; \
    frame-ancestors 'none'";

/// Add security headers to all responses.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(CSP));

    response
}
