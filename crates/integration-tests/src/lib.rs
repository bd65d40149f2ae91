//! Shared harness for the router-level integration tests.
//!
//! The tests drive the real storefront router - session layer, unauthorized
//! interceptor, auth extractors, handlers - in process via `tower`'s
//! `oneshot`, with no live backend. The configured backend URL points at a
//! closed port: requests that survive the guards and actually call the
//! backend fail with a transport error (mapped to 502), which the tests
//! treat as proof the guard allowed the request through.
//!
//! Test-only routes are merged next to the real ones:
//! - `GET /test/seed?token=..` stores a credential in the session
//! - `GET /test/peek` reports whether a credential is stored
//! - `GET /test/unauthorized` answers 401 (exercises the interceptor)
//! - `GET /test/teapot` answers 418 (exercises pass-through)

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{
    Router,
    body::Body,
    extract::Query,
    http::{Request, Response, StatusCode, header},
    routing::get,
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tower::ServiceExt;
use tower_sessions::Session;
use url::Url;

use voltcart_storefront::config::StorefrontConfig;
use voltcart_storefront::middleware::{
    clear_token, create_session_layer, set_token, token, unauthorized_interceptor,
};
use voltcart_storefront::routes;
use voltcart_storefront::state::AppState;

/// Configuration pointing at a backend that is not there.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        api_base_url: Url::parse("http://127.0.0.1:59999").expect("static url"),
        host: "127.0.0.1".parse().expect("static addr"),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

#[derive(Deserialize)]
struct SeedQuery {
    token: Option<String>,
}

/// Store (or clear) a credential in the session.
async fn seed(session: Session, Query(query): Query<SeedQuery>) -> StatusCode {
    let result = match query.token {
        Some(token) => set_token(&session, &token).await,
        None => clear_token(&session).await,
    };

    match result {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Report whether a credential is currently stored.
async fn peek(session: Session) -> &'static str {
    if token(&session).await.is_some() {
        "some"
    } else {
        "none"
    }
}

fn test_routes() -> Router<AppState> {
    Router::new()
        .route("/test/seed", get(seed))
        .route("/test/peek", get(peek))
        .route("/test/unauthorized", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/test/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
}

/// The storefront router with the real middleware stack plus test routes.
#[must_use]
pub fn test_app() -> Router {
    let config = test_config();
    let state = AppState::new(config.clone());
    let session_layer = create_session_layer(&config);

    Router::new()
        .merge(routes::routes())
        .merge(test_routes())
        .layer(axum::middleware::from_fn(unauthorized_interceptor))
        .layer(session_layer)
        .with_state(state)
}

/// Mint an unsigned three-segment token carrying the given claims JSON.
#[must_use]
pub fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// Send one request through the app.
///
/// # Panics
///
/// Panics if the router fails, which is a test failure anyway.
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request build");

    app.clone().oneshot(request).await.expect("infallible")
}

/// GET shorthand.
pub async fn get_path(app: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, "GET", path, cookie, None).await
}

/// Seed a session with a credential; returns the session cookie to replay.
///
/// # Panics
///
/// Panics if the session layer did not issue a cookie.
pub async fn seed_session(app: &Router, token: &str) -> String {
    let response = get_path(
        app,
        &format!("/test/seed?token={}", urlencode(token)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie issued")
        .to_str()
        .expect("ascii cookie");

    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Location header of a redirect response.
///
/// # Panics
///
/// Panics if the response is not a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

/// Read the full response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

/// Minimal percent-encoding for the token query parameter (JWT segments are
/// URL-safe already; only the dots need no escaping, but be thorough).
fn urlencode(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                c.to_string()
            } else {
                format!("%{:02X}", c as u32)
            }
        })
        .collect()
}
