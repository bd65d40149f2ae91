//! Authentication extractors and credential-store helpers.
//!
//! The credential is one opaque bearer string under a single session key.
//! [`current_session`] is the only place it is decoded: guards, handlers,
//! and the navigation shell all consume the same derivation, and any decode
//! failure (malformed or expired token) purges the stored credential as a
//! side effect, so stale state self-heals on the next request.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use voltcart_core::Role;

use crate::middleware::policy::{ADMIN_ONLY, Access, LOGIN_ROUTE, RoutePolicy};
use crate::models::{Claims, SessionUser, session_keys};

// =============================================================================
// Credential store
// =============================================================================

/// Read the stored bearer credential, if any.
pub async fn token(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::TOKEN)
        .await
        .ok()
        .flatten()
}

/// Store the bearer credential, overwriting any previous value.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_token(
    session: &Session,
    token: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::TOKEN, token).await
}

/// Remove the stored bearer credential. Idempotent.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::TOKEN).await?;
    Ok(())
}

// =============================================================================
// Session derivation
// =============================================================================

/// Derive the current session from the stored credential.
///
/// Returns `None` when no credential is stored, or when the stored one is
/// malformed or expired - in which case it is purged before returning, so
/// every caller implicitly self-heals stale state.
pub async fn current_session(session: &Session) -> Option<SessionUser> {
    let token = token(session).await?;
    let now_ms = chrono::Utc::now().timestamp_millis();

    match Claims::validate(&token, now_ms) {
        Ok(claims) => Some(SessionUser::new(token, claims)),
        Err(reason) => {
            tracing::debug!(%reason, "purging stale credential");
            if let Err(e) = clear_token(session).await {
                tracing::error!("Failed to purge stale credential: {e}");
            }
            None
        }
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Rejection for the auth extractors: a history-replacing redirect to the
/// route the policy demands.
pub enum AuthRejection {
    /// No valid session; go sign in.
    RedirectToLogin,
    /// Valid session but insufficient role; back to the listing.
    RedirectHome,
    /// Valid session on a guest-only page; go to the role's landing page.
    RedirectLanding(Role),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_ROUTE).into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::RedirectLanding(role) => Redirect::to(role.landing_route()).into_response(),
        }
    }
}

/// Evaluate a policy against the request's session.
async fn evaluate(
    parts: &Parts,
    policy: RoutePolicy,
) -> Result<Option<SessionUser>, AuthRejection> {
    let user = match parts.extensions.get::<Session>() {
        Some(session) => current_session(session).await,
        None => None,
    };

    match policy.evaluate(user.as_ref().map(|u| &u.claims)) {
        Access::Allowed => Ok(user),
        Access::RedirectLogin => Err(AuthRejection::RedirectToLogin),
        Access::RedirectHome => Err(AuthRejection::RedirectHome),
        Access::RedirectLanding(role) => Err(AuthRejection::RedirectLanding(role)),
    }
}

/// Extractor that requires a valid session of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn cart(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub SessionUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = evaluate(parts, RoutePolicy::Authenticated).await?;
        // Authenticated + Allowed always carries a session
        user.map(Self).ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that requires a valid session with the admin role.
///
/// Unauthenticated visitors are sent to login; signed-in non-admins are sent
/// back to the product listing.
pub struct RequireAdmin(pub SessionUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = evaluate(parts, ADMIN_ONLY).await?;
        user.map(Self).ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor for guest-only pages (login, registration, recovery).
///
/// A visitor with a valid session is redirected to their landing page
/// instead of seeing the guest page again.
pub struct RequireGuest;

impl<S> FromRequestParts<S> for RequireGuest
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        evaluate(parts, RoutePolicy::GuestOnly).await?;
        Ok(Self)
    }
}

/// Extractor that optionally yields the current session.
///
/// Never rejects; pages that render for both guests and users (the
/// navigation shell on every page) use this.
pub struct OptionalAuth(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_session(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}
