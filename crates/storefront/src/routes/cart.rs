//! Cart route handlers.
//!
//! The cart lives on the backend; every operation round-trips and the page
//! re-renders from the fresh state.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use voltcart_core::{CartItemId, Price, ProductId};

use crate::api::ApiClient;
use crate::api::types::CartItem;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::{MessageQuery, NavContext, flash_redirect};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: String,
    pub product_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl CartItemView {
    fn from_item(item: &CartItem, api: &ApiClient) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product.id.to_string(),
            title: item.product.title.clone(),
            image_url: item.product.image.as_deref().map(|f| api.image_url(f)),
            quantity: item.quantity,
            price: item.price.display(),
            line_total: item.total_price.display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: usize,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::ZERO.display(),
            item_count: 0,
        }
    }

    /// Build the view, totalling on the client side of the wire.
    #[must_use]
    pub fn from_items(items: &[CartItem], api: &ApiClient) -> Self {
        let total: Price = items.iter().map(|item| item.total_price).sum();
        Self {
            items: items
                .iter()
                .map(|item| CartItemView::from_item(item, api))
                .collect(),
            total: total.display(),
            item_count: items.len(),
        }
    }
}

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub quantity: u32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: NavContext,
    pub cart: CartView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(message): Query<MessageQuery>,
) -> Result<CartShowTemplate> {
    let cart = match state.api().cart(user.bearer()).await {
        Ok(items) => CartView::from_items(&items, state.api()),
        Err(e) if !e.is_unauthorized() => {
            tracing::warn!("Failed to fetch cart: {e}");
            CartView::empty()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(CartShowTemplate {
        nav: NavContext::for_session(Some(&user)),
        cart,
        error: message.error,
        success: message.success,
    })
}

/// Add one unit of a product, then return to the cart.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    state
        .api()
        .add_to_cart(user.bearer(), &form.product_id)
        .await?;

    Ok(flash_redirect("/cart", "success", "Added to cart"))
}

/// Set a line's quantity. Zero or missing quantities are ignored, matching
/// the stepper UI which never goes below one.
#[instrument(skip_all, fields(id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
    Form(form): Form<UpdateQuantityForm>,
) -> Result<Redirect> {
    if form.quantity >= 1 {
        state
            .api()
            .update_cart_item(user.bearer(), &id, form.quantity)
            .await?;
    }

    Ok(Redirect::to("/cart"))
}

/// Remove a line.
#[instrument(skip_all, fields(id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
) -> Result<Redirect> {
    state.api().remove_cart_item(user.bearer(), &id).await?;

    Ok(Redirect::to("/cart"))
}
