//! Checkout route handlers: shipping addresses and the payment selector.
//!
//! Payment is intentionally stubbed: cash-on-delivery is the only live
//! method, the online option renders disabled with a "Coming Soon" badge.
//! Placing an order forwards the cart lines, the chosen address, and `cod`
//! to the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use voltcart_core::{AddressId, PaymentMethod};

use crate::api::ApiError;
use crate::api::types::{Address, AddressInput, OrderLineInput};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::cart::CartView;
use crate::routes::{NavContext, flash_redirect};
use crate::state::AppState;

/// One entry in the payment method selector.
#[derive(Debug, Clone, Copy)]
pub struct PaymentOption {
    pub method: PaymentMethod,
    pub description: &'static str,
    pub available: bool,
    pub badge: Option<&'static str>,
}

/// The selector as rendered, in order.
pub const PAYMENT_OPTIONS: &[PaymentOption] = &[
    PaymentOption {
        method: PaymentMethod::Cod,
        description: "Pay when your order arrives at your doorstep.",
        available: true,
        badge: None,
    },
    PaymentOption {
        method: PaymentMethod::Upi,
        description: "Pay securely using UPI, Cards, or Net Banking.",
        available: false,
        badge: Some("Coming Soon"),
    },
];

/// Address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

impl From<AddressForm> for AddressInput {
    fn from(form: AddressForm) -> Self {
        Self {
            full_name: form.full_name,
            address: form.address,
            city: form.city,
            state: form.state,
            pincode: form.pincode,
            phone: form.phone,
        }
    }
}

/// Place-order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub address_id: Option<AddressId>,
    pub payment_method: PaymentMethod,
}

/// Query parameters for the checkout page.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    /// Address being edited inline, if any.
    pub edit: Option<AddressId>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub nav: NavContext,
    pub cart: CartView,
    pub addresses: Vec<Address>,
    pub editing: Option<Address>,
    pub payment_options: &'static [PaymentOption],
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the checkout page: cart summary, address book, payment selector.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<CheckoutQuery>,
) -> Result<CheckoutTemplate> {
    let (cart, addresses) = tokio::join!(
        state.api().cart(user.bearer()),
        state.api().addresses(user.bearer()),
    );
    let cart_items = cart?;
    let addresses = addresses?;

    let editing = query
        .edit
        .and_then(|id| addresses.iter().find(|a| a.id == id).cloned());

    Ok(CheckoutTemplate {
        nav: NavContext::for_session(Some(&user)),
        cart: CartView::from_items(&cart_items, state.api()),
        addresses,
        editing,
        payment_options: PAYMENT_OPTIONS,
        error: query.error,
        success: query.success,
    })
}

/// Create a shipping address.
#[instrument(skip_all)]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match state
        .api()
        .create_address(user.bearer(), &form.into())
        .await
    {
        Ok(_) => Ok(flash_redirect("/checkout", "success", "Address saved").into_response()),
        Err(ApiError::Rejected { message, .. }) => {
            Ok(flash_redirect("/checkout", "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Update a shipping address.
#[instrument(skip_all, fields(id = %id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match state
        .api()
        .update_address(user.bearer(), &id, &form.into())
        .await
    {
        Ok(_) => Ok(flash_redirect("/checkout", "success", "Address updated").into_response()),
        Err(ApiError::Rejected { message, .. }) => {
            Ok(flash_redirect("/checkout", "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a shipping address.
#[instrument(skip_all, fields(id = %id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect> {
    state.api().delete_address(user.bearer(), &id).await?;

    Ok(Redirect::to("/checkout"))
}

/// Place the order.
///
/// Requires a selected address and an available payment method; the cart is
/// re-fetched so the order reflects the backend's current state, not a
/// stale page.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response> {
    let Some(address_id) = form.address_id else {
        return Ok(
            flash_redirect("/checkout", "error", "Please select a shipping address")
                .into_response(),
        );
    };

    if form.payment_method != PaymentMethod::Cod {
        return Ok(flash_redirect(
            "/checkout",
            "error",
            "This payment method is not available yet",
        )
        .into_response());
    }

    let (cart, addresses) = tokio::join!(
        state.api().cart(user.bearer()),
        state.api().addresses(user.bearer()),
    );
    let cart_items = cart?;
    let addresses = addresses?;

    if cart_items.is_empty() {
        return Ok(flash_redirect("/cart", "error", "Your cart is empty").into_response());
    }

    let Some(shipping_address) = addresses.into_iter().find(|a| a.id == address_id) else {
        return Ok(
            flash_redirect("/checkout", "error", "Please select a shipping address")
                .into_response(),
        );
    };

    let lines: Vec<OrderLineInput> = cart_items
        .iter()
        .map(|item| OrderLineInput {
            product_id: item.product.id.clone(),
            quantity: item.quantity,
        })
        .collect();

    match state
        .api()
        .place_order(user.bearer(), &lines, &shipping_address, PaymentMethod::Cod)
        .await
    {
        Ok(()) => Ok(flash_redirect("/orders", "success", "Order placed successfully!")
            .into_response()),
        Err(ApiError::Rejected { message, .. }) => {
            Ok(flash_redirect("/checkout", "error", &message).into_response())
        }
        Err(e) => Err(AppError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_selector_only_offers_cod_live() {
        let live: Vec<_> = PAYMENT_OPTIONS.iter().filter(|o| o.available).collect();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].method, PaymentMethod::Cod);

        let stubbed = PAYMENT_OPTIONS
            .iter()
            .find(|o| o.method == PaymentMethod::Upi)
            .expect("upi option");
        assert!(!stubbed.available);
        assert_eq!(stubbed.badge, Some("Coming Soon"));
    }
}
