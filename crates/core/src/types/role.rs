//! User roles carried in the session claims.

use serde::{Deserialize, Serialize};

/// Role claimed by a signed-in user.
///
/// The role is read from the bearer token's claims and gates which routes a
/// session may view. It is a display/navigation convenience only - the
/// backend re-checks the role on every authenticated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    #[default]
    User,
    /// Store administrator with access to the dashboard and management pages.
    Admin,
}

impl Role {
    /// Whether this role grants access to the admin pages.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The route a session with this role lands on after leaving a
    /// guest-only page.
    #[must_use]
    pub const fn landing_route(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::User => "/",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Admin).expect("serialize"),
            "\"admin\""
        );
        let role: Role = serde_json::from_str("\"user\"").expect("deserialize");
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
        assert!(Role::from_str("root").is_err());
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(Role::Admin.landing_route(), "/admin");
        assert_eq!(Role::User.landing_route(), "/");
    }

    #[test]
    fn test_default_is_user() {
        assert_eq!(Role::default(), Role::User);
        assert!(!Role::default().is_admin());
    }
}
