//! Route guard behaviour across the policy table.
//!
//! The backend is unreachable in these tests, so any request that passes a
//! guard and fetches data answers 502; a request the guard denies answers
//! with a redirect before any backend call. Pages that degrade gracefully
//! (the cart) or render without data (admin product form) answer 200.

use axum::http::StatusCode;
use serde_json::json;

use voltcart_integration_tests::{get_path, location, make_token, seed_session, test_app};

fn user_token() -> String {
    make_token(&json!({
        "sub": "u1",
        "username": "asha",
        "role": "user",
        "exp": 4_000_000_000_i64,
    }))
}

fn admin_token() -> String {
    make_token(&json!({
        "sub": "a1",
        "username": "root",
        "role": "admin",
        "exp": 4_000_000_000_i64,
    }))
}

#[tokio::test]
async fn unauthenticated_request_to_protected_route_redirects_to_login() {
    let app = test_app();

    for path in ["/cart", "/checkout", "/orders", "/search"] {
        let response = get_path(&app, path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(location(&response), "/auth/login", "path {path}");
    }
}

#[tokio::test]
async fn unauthenticated_request_to_admin_route_redirects_to_login() {
    let app = test_app();

    let response = get_path(&app, "/admin/products/new", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn user_session_is_allowed_on_any_role_route() {
    let app = test_app();
    let cookie = seed_session(&app, &user_token()).await;

    // The cart page renders (empty) even with the backend down
    let response = get_path(&app, "/cart", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_session_is_allowed_on_any_role_route() {
    let app = test_app();
    let cookie = seed_session(&app, &admin_token()).await;

    let response = get_path(&app, "/cart", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_session_on_admin_route_redirects_home() {
    let app = test_app();
    let cookie = seed_session(&app, &user_token()).await;

    let response = get_path(&app, "/admin/products/new", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn admin_session_on_admin_route_is_allowed() {
    let app = test_app();
    let cookie = seed_session(&app, &admin_token()).await;

    let response = get_path(&app, "/admin/products/new", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn guest_only_route_redirects_valid_sessions_to_their_landing() {
    let app = test_app();

    let cookie = seed_session(&app, &user_token()).await;
    let response = get_path(&app, "/auth/login", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let cookie = seed_session(&app, &admin_token()).await;
    let response = get_path(&app, "/auth/register", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
}

#[tokio::test]
async fn guest_only_route_renders_for_guests() {
    let app = test_app();

    let response = get_path(&app, "/auth/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_credential_is_purged_and_redirected_to_login() {
    let app = test_app();

    // exp far in the past
    let expired = make_token(&json!({
        "sub": "u1",
        "role": "user",
        "exp": 1_000_000_000_i64,
    }));
    let cookie = seed_session(&app, &expired).await;

    let response = get_path(&app, "/cart", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    // The decode-and-purge side effect removed the stale credential
    let peek = get_path(&app, "/test/peek", Some(&cookie)).await;
    let body = voltcart_integration_tests::body_text(peek).await;
    assert_eq!(body, "none");
}

#[tokio::test]
async fn malformed_credential_is_purged_and_redirected_to_login() {
    let app = test_app();
    let cookie = seed_session(&app, "not-a-jwt").await;

    let response = get_path(&app, "/orders", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    let peek = get_path(&app, "/test/peek", Some(&cookie)).await;
    let body = voltcart_integration_tests::body_text(peek).await;
    assert_eq!(body, "none");
}

#[tokio::test]
async fn expired_session_on_guest_page_is_treated_as_guest() {
    let app = test_app();

    let expired = make_token(&json!({
        "sub": "u1",
        "role": "admin",
        "exp": 1_000_000_000_i64,
    }));
    let cookie = seed_session(&app, &expired).await;

    // Not bounced to a landing page: the stale session counts as no session
    let response = get_path(&app, "/auth/login", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
