//! Domain models for the storefront.

pub mod session;

pub use session::{Claims, SessionUser, TokenError, session_keys};
