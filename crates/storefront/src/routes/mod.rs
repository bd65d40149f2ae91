//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Product listing with filters     [public]
//! GET  /health                  - Liveness check                   [public]
//!
//! # Products
//! GET  /products/{id}           - Product detail                   [public]
//! GET  /search                  - Title search                     [auth]
//!
//! # Auth
//! GET  /auth/login              - Login page                       [guest]
//! POST /auth/login              - Login action                     [guest]
//! GET  /auth/register           - Registration page                [guest]
//! POST /auth/register           - Registration action              [guest]
//! GET  /auth/verify             - Email OTP verification page      [guest]
//! POST /auth/verify             - Email OTP verification action    [guest]
//! GET  /auth/forgot-password    - Password recovery (3 steps)      [guest]
//! POST /auth/forgot-password    - Step 1: send OTP                 [guest]
//! POST /auth/forgot-password/verify - Step 2: check OTP            [guest]
//! POST /auth/forgot-password/reset  - Step 3: set new password     [guest]
//! POST /auth/logout             - Logout action
//!
//! # Cart
//! GET  /cart                    - Cart page                        [auth]
//! POST /cart/add                - Add product                      [auth]
//! POST /cart/{id}/update        - Set line quantity                [auth]
//! POST /cart/{id}/remove        - Remove line                      [auth]
//!
//! # Checkout
//! GET  /checkout                - Address + payment selection      [auth]
//! POST /checkout/address        - Create address                   [auth]
//! POST /checkout/address/{id}/update - Update address              [auth]
//! POST /checkout/address/{id}/delete - Delete address              [auth]
//! POST /checkout/place-order    - Place the order                  [auth]
//!
//! # Orders
//! GET  /orders                  - Order history                    [auth]
//!
//! # Admin
//! GET  /admin                   - Dashboard with analytics         [admin]
//! GET  /admin/orders            - Order management                 [admin]
//! POST /admin/orders/{id}/status - Update order status             [admin]
//! GET  /admin/products          - Product management               [admin]
//! GET  /admin/products/new      - New product form                 [admin]
//! POST /admin/products/new      - Create product                   [admin]
//! GET  /admin/products/{id}/edit - Edit product form               [admin]
//! POST /admin/products/{id}/edit - Update product                  [admin]
//! POST /admin/products/{id}/delete - Delete product                [admin]
//! ```
//!
//! Access policies are enforced by the extractors each handler declares
//! (`RequireAuth`, `RequireAdmin`, `RequireGuest`, `OptionalAuth`); the
//! global unauthorized interceptor covers mid-session credential rejection.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod search;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use voltcart_core::Role;

use crate::models::SessionUser;
use crate::state::AppState;

// =============================================================================
// Shared view context
// =============================================================================

/// Identity shown in the navigation shell.
#[derive(Debug, Clone)]
pub struct NavUser {
    pub name: String,
    pub role: Role,
}

/// Per-request navigation shell state.
///
/// Rebuilt from the session on every request so the shell always reflects
/// the credential's current validity.
#[derive(Debug, Clone)]
pub struct NavContext {
    pub user: Option<NavUser>,
    /// Auth pages hide the shell entirely.
    pub hidden: bool,
}

impl NavContext {
    /// Shell state for the current session (possibly guest).
    #[must_use]
    pub fn for_session(user: Option<&SessionUser>) -> Self {
        Self {
            user: user.map(|u| NavUser {
                name: u.display_name().to_string(),
                role: u.claims.role,
            }),
            hidden: false,
        }
    }

    /// Shell hidden (login/registration/recovery pages).
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            user: None,
            hidden: true,
        }
    }

    /// Whether the admin links render.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }
}

/// Query parameters for transient notices carried across redirects.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect to `path` with a percent-encoded notice attached.
pub(crate) fn flash_redirect(path: &str, kind: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?{kind}={}", urlencoding::encode(message)))
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/verify", get(auth::verify_page).post(auth::verify))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::send_reset_otp),
        )
        .route("/forgot-password/verify", post(auth::verify_reset_otp))
        .route("/forgot-password/reset", post(auth::reset_password))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/{id}/update", post(cart::update))
        .route("/{id}/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/address", post(checkout::create_address))
        .route("/address/{id}/update", post(checkout::update_address))
        .route("/address/{id}/delete", post(checkout::delete_address))
        .route("/place-order", post(checkout::place_order))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", post(admin::update_status))
        .route("/products", get(products::manage))
        .route(
            "/products/new",
            get(products::new_form).post(products::create),
        )
        .route(
            "/products/{id}/edit",
            get(products::edit_form).post(products::update),
        )
        .route("/products/{id}/delete", post(products::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Product listing is the home page
        .route("/", get(home::index))
        .route("/products/{id}", get(products::show))
        .route("/search", get(search::index))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Order history
        .route("/orders", get(orders::index))
        // Auth routes
        .nest("/auth", auth_routes())
        // Admin routes (each handler requires the admin role)
        .nest("/admin", admin_routes())
}
