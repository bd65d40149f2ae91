//! Session claims derived from the stored bearer credential.
//!
//! The credential is an opaque JWT issued by the commerce backend. The
//! storefront decodes its claims payload **without verifying the
//! signature**: the client has no key material, and these claims only drive
//! navigation and page gating. The backend re-validates the token on every
//! authenticated call, which is the actual enforcement point.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use voltcart_core::Role;

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for the single stored bearer credential.
    pub const TOKEN: &str = "token";
}

/// Why a bearer token failed to decode into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a three-segment JWT, payload not base64, claims not JSON, or an
    /// unknown role value.
    #[error("malformed bearer token")]
    Malformed,
    /// Claims parsed but the expiry is in the past.
    #[error("bearer token expired")]
    Expired,
}

/// Claims carried in the backend-issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier (the backend's user id).
    pub sub: String,
    /// Display name chosen at registration.
    #[serde(default)]
    pub username: Option<String>,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Role gate for navigation and admin pages. Tokens without a role
    /// claim are regular users.
    #[serde(default)]
    pub role: Role,
    /// Expiry, seconds since epoch. Absent means non-expiring.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued-at, seconds since epoch.
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    /// Parse the claims payload of a compact JWT without verifying the
    /// signature.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] when the token is not three
    /// dot-separated segments, the payload is not base64url, or the claims
    /// JSON does not match the expected shape.
    pub fn decode_unverified(token: &str) -> Result<Self, TokenError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;

        serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
    }

    /// Decode and check expiry against `now_ms` (milliseconds since epoch).
    ///
    /// An `exp` exactly equal to the current time is *not yet* expired; the
    /// boundary uses strict less-than.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] or [`TokenError::Expired`].
    pub fn validate(token: &str, now_ms: i64) -> Result<Self, TokenError> {
        let claims = Self::decode_unverified(token)?;
        if claims.is_expired(now_ms) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Whether the claims' expiry (if any) is strictly in the past.
    #[must_use]
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.exp
            .is_some_and(|exp| exp.saturating_mul(1000) < now_ms)
    }

    /// Best display name for the navigation shell.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("User")
    }
}

/// A live session: the stored credential plus its decoded claims.
///
/// Produced only by `middleware::auth::current_session`, so holding one
/// means the credential parsed and was unexpired at derivation time. The
/// raw token rides along because every authenticated backend call needs it
/// in the `Authorization` header.
#[derive(Debug, Clone)]
pub struct SessionUser {
    token: String,
    /// Decoded claims the token carried.
    pub claims: Claims,
}

impl SessionUser {
    /// Pair a raw credential with its decoded claims.
    #[must_use]
    pub const fn new(token: String, claims: Claims) -> Self {
        Self { token, claims }
    }

    /// The bearer credential for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> &str {
        &self.token
    }

    /// Best display name for the navigation shell.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.claims.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn test_decode_valid_token() {
        let token = encode_token(&json!({
            "sub": "u1",
            "username": "asha",
            "email": "asha@example.com",
            "role": "admin",
            "exp": 2_000_000_000,
            "iat": 1_700_000_000,
        }));
        let claims = Claims::decode_unverified(&token).expect("decode");
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, Some(2_000_000_000));
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        assert_eq!(
            Claims::decode_unverified("onlyonesegment"),
            Err(TokenError::Malformed)
        );
        assert_eq!(Claims::decode_unverified("a.b"), Err(TokenError::Malformed));
        assert_eq!(
            Claims::decode_unverified("a.b.c.d"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_decode_rejects_bad_base64_and_bad_json() {
        assert_eq!(
            Claims::decode_unverified("h.!!!not-base64!!!.s"),
            Err(TokenError::Malformed)
        );

        let payload = URL_SAFE_NO_PAD.encode(b"not json at all");
        assert_eq!(
            Claims::decode_unverified(&format!("h.{payload}.s")),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_decode_rejects_unknown_role() {
        let token = encode_token(&json!({ "sub": "u1", "role": "superuser" }));
        assert_eq!(Claims::decode_unverified(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        let token = encode_token(&json!({ "sub": "u1" }));
        let claims = Claims::decode_unverified(&token).expect("decode");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let token = encode_token(&json!({ "sub": "u1", "exp": 1_000 }));
        let claims = Claims::decode_unverified(&token).expect("decode");

        // exp * 1000 == now → not yet expired
        assert!(!claims.is_expired(1_000_000));
        // one millisecond later → expired
        assert!(claims.is_expired(1_000_001));

        assert!(Claims::validate(&token, 1_000_000).is_ok());
        assert_eq!(
            Claims::validate(&token, 1_000_001),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_token_without_exp_never_expires() {
        let token = encode_token(&json!({ "sub": "u1" }));
        let claims = Claims::decode_unverified(&token).expect("decode");
        assert!(!claims.is_expired(i64::MAX));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let token = encode_token(&json!({ "sub": "u1", "email": "x@example.com" }));
        let claims = Claims::decode_unverified(&token).expect("decode");
        assert_eq!(claims.display_name(), "x@example.com");

        let token = encode_token(&json!({ "sub": "u1" }));
        let claims = Claims::decode_unverified(&token).expect("decode");
        assert_eq!(claims.display_name(), "User");
    }
}
