//! Declarative route access policies.
//!
//! Every route declares one policy; the auth extractors evaluate it against
//! the current session on every request. Evaluation is synchronous and never
//! cached - a navigation after logout or expiry re-runs the full check.

use voltcart_core::Role;

use crate::models::Claims;

/// The login page, target of every denied-unauthenticated redirect.
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Policy for routes only admins may view.
pub const ADMIN_ONLY: RoutePolicy = RoutePolicy::RoleRestricted(&[Role::Admin]);

/// Who may view a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Anyone, session or not.
    Public,
    /// Only visitors without a valid session (login, registration, ...).
    /// A signed-in visitor is sent to their role's landing page.
    GuestOnly,
    /// Any valid session, regardless of role.
    Authenticated,
    /// A valid session whose role is in the allowed set.
    RoleRestricted(&'static [Role]),
}

/// Outcome of evaluating a policy against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Mount the page.
    Allowed,
    /// No valid session where one is required.
    RedirectLogin,
    /// Valid session, wrong role.
    RedirectHome,
    /// Valid session on a guest-only page; send to the role's landing page.
    RedirectLanding(Role),
}

impl RoutePolicy {
    /// Evaluate this policy against the (already decoded) session.
    ///
    /// `None` means no session: no credential, or one that failed to decode
    /// and has been purged.
    #[must_use]
    pub fn evaluate(&self, session: Option<&Claims>) -> Access {
        match self {
            Self::Public => Access::Allowed,
            Self::GuestOnly => session
                .map_or(Access::Allowed, |claims| {
                    Access::RedirectLanding(claims.role)
                }),
            Self::Authenticated => {
                if session.is_some() {
                    Access::Allowed
                } else {
                    Access::RedirectLogin
                }
            }
            Self::RoleRestricted(allowed) => match session {
                None => Access::RedirectLogin,
                Some(claims) if allowed.contains(&claims.role) => Access::Allowed,
                Some(_) => Access::RedirectHome,
            },
        }
    }
}

impl Access {
    /// Redirect target for a denial, `None` when allowed.
    #[must_use]
    pub const fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Allowed => None,
            Self::RedirectLogin => Some(LOGIN_ROUTE),
            Self::RedirectHome => Some("/"),
            Self::RedirectLanding(role) => Some(role.landing_route()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "u1".to_string(),
            username: Some("asha".to_string()),
            email: None,
            role,
            exp: None,
            iat: None,
        }
    }

    const USER_OR_ADMIN: RoutePolicy = RoutePolicy::RoleRestricted(&[Role::User, Role::Admin]);

    #[test]
    fn test_public_always_allows() {
        assert_eq!(RoutePolicy::Public.evaluate(None), Access::Allowed);
        assert_eq!(
            RoutePolicy::Public.evaluate(Some(&claims(Role::Admin))),
            Access::Allowed
        );
    }

    #[test]
    fn test_authenticated_requires_session() {
        assert_eq!(
            RoutePolicy::Authenticated.evaluate(None),
            Access::RedirectLogin
        );
        assert_eq!(
            RoutePolicy::Authenticated.evaluate(Some(&claims(Role::User))),
            Access::Allowed
        );
    }

    #[test]
    fn test_admin_token_on_user_or_admin_route_is_allowed() {
        assert_eq!(
            USER_OR_ADMIN.evaluate(Some(&claims(Role::Admin))),
            Access::Allowed
        );
    }

    #[test]
    fn test_user_token_on_admin_route_redirects_home() {
        assert_eq!(
            ADMIN_ONLY.evaluate(Some(&claims(Role::User))),
            Access::RedirectHome
        );
        assert_eq!(
            Access::RedirectHome.redirect_target(),
            Some("/")
        );
    }

    #[test]
    fn test_no_session_on_role_route_redirects_login() {
        assert_eq!(ADMIN_ONLY.evaluate(None), Access::RedirectLogin);
        assert_eq!(
            Access::RedirectLogin.redirect_target(),
            Some(LOGIN_ROUTE)
        );
    }

    #[test]
    fn test_guest_only_redirects_by_role() {
        assert_eq!(RoutePolicy::GuestOnly.evaluate(None), Access::Allowed);
        assert_eq!(
            RoutePolicy::GuestOnly.evaluate(Some(&claims(Role::User))),
            Access::RedirectLanding(Role::User)
        );
        assert_eq!(
            Access::RedirectLanding(Role::Admin).redirect_target(),
            Some("/admin")
        );
        assert_eq!(
            Access::RedirectLanding(Role::User).redirect_target(),
            Some("/")
        );
    }
}
