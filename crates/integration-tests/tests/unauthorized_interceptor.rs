//! The global unauthorized interceptor: backend credential rejection purges
//! the session and lands on login, regardless of which page made the call.

use axum::http::StatusCode;
use serde_json::json;

use voltcart_integration_tests::{
    body_text, get_path, location, make_token, seed_session, test_app,
};

fn valid_token() -> String {
    make_token(&json!({
        "sub": "u1",
        "username": "asha",
        "role": "user",
        "exp": 4_000_000_000_i64,
    }))
}

#[tokio::test]
async fn a_401_response_clears_the_credential_and_redirects_to_login() {
    let app = test_app();
    let cookie = seed_session(&app, &valid_token()).await;

    let response = get_path(&app, "/test/unauthorized", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?error=session_expired");

    // Credential was purged by the interceptor
    let peek = get_path(&app, "/test/peek", Some(&cookie)).await;
    assert_eq!(body_text(peek).await, "none");
}

#[tokio::test]
async fn the_login_page_then_shows_the_session_notice() {
    let app = test_app();
    let cookie = seed_session(&app, &valid_token()).await;

    let redirect = get_path(&app, "/test/unauthorized", Some(&cookie)).await;
    let target = location(&redirect).to_string();

    let login = get_path(&app, &target, Some(&cookie)).await;
    assert_eq!(login.status(), StatusCode::OK);
    let html = body_text(login).await;
    assert!(html.contains("session has expired"), "notice missing: {html}");
}

#[tokio::test]
async fn other_statuses_pass_through_untouched() {
    let app = test_app();
    let cookie = seed_session(&app, &valid_token()).await;

    let response = get_path(&app, "/test/teapot", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

    // Credential survives a non-authorization failure
    let peek = get_path(&app, "/test/peek", Some(&cookie)).await;
    assert_eq!(body_text(peek).await, "some");
}

#[tokio::test]
async fn interception_works_without_a_session_too() {
    let app = test_app();

    let response = get_path(&app, "/test/unauthorized", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?error=session_expired");
}
