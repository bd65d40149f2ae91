//! Global unauthorized interceptor.
//!
//! A single router-wide hook (installed once in `main`) that inspects every
//! outgoing response. When a handler answers 401 - which is how a backend
//! authorization failure surfaces, regardless of which page made the call -
//! the stored credential is purged and the response is rewritten into a
//! redirect to the login page with a visible notice. The UI can therefore
//! never keep showing authenticated content after the backend has rejected
//! the credential, even if the page itself does not handle the error.
//!
//! All other statuses pass through unchanged for local handling.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::clear_sentry_user;
use crate::middleware::auth::clear_token;
use crate::middleware::policy::LOGIN_ROUTE;

/// Login redirect carrying the session-expired notice.
pub const SESSION_EXPIRED_REDIRECT: &str = "/auth/login?error=session_expired";

/// Middleware that converts any 401 response into credential purge +
/// login redirect.
pub async fn unauthorized_interceptor(
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    // Never rewrite the login page itself, or a failed sign-in attempt
    // would loop through the interceptor.
    let is_login_route = request.uri().path() == LOGIN_ROUTE;

    let response = next.run(request).await;

    if response.status() == StatusCode::UNAUTHORIZED && !is_login_route {
        tracing::info!("backend rejected credential; purging session");

        if let Err(e) = clear_token(&session).await {
            tracing::error!("Failed to purge credential after 401: {e}");
        }
        clear_sentry_user();

        return Redirect::to(SESSION_EXPIRED_REDIRECT).into_response();
    }

    response
}
