//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, in-memory store)
//! 5. Unauthorized interceptor (purge credential on backend 401)
//! 6. Security headers

pub mod auth;
pub mod policy;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod unauthorized;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, RequireGuest, clear_token,
    current_session, set_token, token,
};
pub use policy::{ADMIN_ONLY, Access, LOGIN_ROUTE, RoutePolicy};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use unauthorized::unauthorized_interceptor;
