//! Commerce backend REST API client.
//!
//! # Architecture
//!
//! - The backend owns all data (products, cart, addresses, orders, users);
//!   the storefront never persists anything beyond the session credential.
//! - Plain REST with JSON bodies over `reqwest`; authenticated calls attach
//!   the session's bearer credential in the `Authorization` header.
//! - A 401/403 on a *bearer-authenticated* call maps to
//!   [`ApiError::Unauthorized`], which the global unauthorized interceptor
//!   turns into credential purge + login redirect. Auth-entry calls (login,
//!   register, OTP) are unauthenticated, so a rejection there surfaces as
//!   [`ApiError::Rejected`] with the backend's message instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use voltcart_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api_base_url);
//!
//! // Browse without a session
//! let products = api.products(&ProductQuery::default()).await?;
//!
//! // Cart calls require the bearer credential
//! let cart = api.cart(&token).await?;
//! ```

mod client;
pub mod types;

pub use client::{ApiClient, ImageUpload, ProductFields, ProductQuery, RegisterOutcome};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend rejected the session credential (401/403 on an
    /// authenticated call).
    #[error("credential rejected by backend")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend refused the request (validation failure, duplicate
    /// email, bad OTP, ...). Carries the backend's user-facing message.
    #[error("{message}")]
    Rejected {
        /// HTTP status the backend answered with.
        status: u16,
        /// Message from the backend's `{"message": ...}` error body.
        message: String,
    },
}

impl ApiError {
    /// Whether this error should be handled by the global unauthorized
    /// interceptor rather than the calling page.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 64f0c2a1".to_string());
        assert_eq!(err.to_string(), "Not found: product 64f0c2a1");

        let err = ApiError::Rejected {
            status: 400,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(
            !ApiError::Rejected {
                status: 400,
                message: "bad input".to_string()
            }
            .is_unauthorized()
        );
    }
}
