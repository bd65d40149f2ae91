//! Navigation shell rendering and logout semantics.
//!
//! The shell is rebuilt from the session on every request; these tests read
//! the rendered cart page (it renders with the backend down) and assert the
//! links and identity indicator follow the session's role.

use axum::http::StatusCode;
use serde_json::json;

use voltcart_integration_tests::{
    body_text, get_path, location, make_token, seed_session, send, test_app,
};

fn user_token() -> String {
    make_token(&json!({
        "sub": "u1",
        "username": "asha",
        "email": "asha@example.com",
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
async fn shell_shows_identity_and_logout_for_a_session() {
    let app = test_app();
    let cookie = seed_session(&app, &user_token()).await;

    let response = get_path(&app, "/cart", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("asha"), "identity indicator missing");
    assert!(html.contains("/auth/logout"), "logout action missing");
    assert!(html.contains("My Orders"), "shopper links missing");
    // No admin affordances for a regular user
    assert!(!html.contains("Manage Products"), "admin link leaked");
}

#[tokio::test]
async fn shell_shows_admin_links_for_an_admin_session() {
    let app = test_app();
    let cookie = seed_session(&app, &admin_token()).await;

    let response = get_path(&app, "/cart", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Manage Products"));
    assert!(html.contains("Add New Product"));
    assert!(html.contains("role-admin"), "role badge missing");
}

#[tokio::test]
async fn username_falls_back_to_email_when_absent() {
    let app = test_app();
    let token = make_token(&json!({
        "sub": "u2",
        "email": "solo@example.com",
        "role": "user",
        "exp": 4_000_000_000_i64,
    }));
    let cookie = seed_session(&app, &token).await;

    let response = get_path(&app, "/cart", Some(&cookie)).await;
    let html = body_text(response).await;
    assert!(html.contains("solo@example.com"));
}

#[tokio::test]
async fn logout_clears_the_session_and_lands_on_login() {
    let app = test_app();
    let cookie = seed_session(&app, &user_token()).await;

    let response = send(&app, "POST", "/auth/logout", Some(&cookie), Some("")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    // The old cookie no longer carries a session
    let after = get_path(&app, "/cart", Some(&cookie)).await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&after), "/auth/login");
}

#[tokio::test]
async fn clearing_the_credential_twice_is_idempotent() {
    let app = test_app();
    let cookie = seed_session(&app, &user_token()).await;

    // Seeding with no token clears; doing it twice leaves the same state
    let first = get_path(&app, "/test/seed", Some(&cookie)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let second = get_path(&app, "/test/seed", Some(&cookie)).await;
    assert_eq!(second.status(), StatusCode::OK);

    let peek = get_path(&app, "/test/peek", Some(&cookie)).await;
    assert_eq!(body_text(peek).await, "none");
}
