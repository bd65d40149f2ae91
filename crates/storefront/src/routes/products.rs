//! Product route handlers: public detail page and admin management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;

use voltcart_core::ProductId;

use crate::api::{ApiClient, ApiError, ImageUpload, ProductFields, ProductQuery};
use crate::api::types::Product;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::routes::{MessageQuery, NavContext, flash_redirect};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl ProductCardView {
    /// Build the card view, resolving the image against the backend origin.
    #[must_use]
    pub fn from_product(product: &Product, api: &ApiClient) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.display(),
            image_url: product.image.as_deref().map(|file| api.image_url(file)),
        }
    }
}

/// Editable product fields for the admin form (raw values, not display).
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: NavContext,
    pub product: ProductCardView,
}

/// Admin product management page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/manage.html")]
pub struct ProductManageTemplate {
    pub nav: NavContext,
    pub products: Vec<ProductCardView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Admin product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub nav: NavContext,
    pub heading: &'static str,
    pub action: String,
    pub form: ProductFormView,
    pub error: Option<String>,
}

// =============================================================================
// Public routes
// =============================================================================

/// Display a single product.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate> {
    let product = state.api().product(&id).await?;

    Ok(ProductShowTemplate {
        nav: NavContext::for_session(user.as_ref()),
        product: ProductCardView::from_product(&product, state.api()),
    })
}

// =============================================================================
// Admin routes
// =============================================================================

/// Admin product management grid.
#[instrument(skip_all)]
pub async fn manage(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(message): Query<MessageQuery>,
) -> Result<ProductManageTemplate> {
    let products = state.api().products(&ProductQuery::default()).await?;

    Ok(ProductManageTemplate {
        nav: NavContext::for_session(Some(&user)),
        products: products
            .iter()
            .map(|p| ProductCardView::from_product(p, state.api()))
            .collect(),
        error: message.error,
        success: message.success,
    })
}

/// Empty product form.
pub async fn new_form(
    RequireAdmin(user): RequireAdmin,
    Query(message): Query<MessageQuery>,
) -> ProductFormTemplate {
    ProductFormTemplate {
        nav: NavContext::for_session(Some(&user)),
        heading: "Add New Product",
        action: "/admin/products/new".to_string(),
        form: ProductFormView::default(),
        error: message.error,
    }
}

/// Create a product from the multipart form.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    multipart: Multipart,
) -> Result<Response> {
    let (fields, image) = read_product_form(multipart).await?;

    if let Err(message) = validate_fields(&fields) {
        return Ok(flash_redirect("/admin/products/new", "error", message).into_response());
    }

    match state.api().create_product(user.bearer(), fields, image).await {
        Ok(()) => {
            Ok(flash_redirect("/admin/products", "success", "Product added").into_response())
        }
        Err(ApiError::Rejected { message, .. }) => {
            Ok(flash_redirect("/admin/products/new", "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Prefilled product form.
#[instrument(skip(state, user))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ProductId>,
    Query(message): Query<MessageQuery>,
) -> Result<ProductFormTemplate> {
    let product = state.api().product(&id).await?;

    Ok(ProductFormTemplate {
        nav: NavContext::for_session(Some(&user)),
        heading: "Edit Product",
        action: format!("/admin/products/{id}/edit"),
        form: ProductFormView {
            id: Some(product.id.to_string()),
            title: product.title,
            description: product.description,
            category: product.category,
            price: product.price.amount().to_string(),
        },
        error: message.error,
    })
}

/// Update a product from the multipart form. A missing image keeps the
/// stored one.
#[instrument(skip_all, fields(id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let (fields, image) = read_product_form(multipart).await?;
    let form_route = format!("/admin/products/{id}/edit");

    if let Err(message) = validate_fields(&fields) {
        return Ok(flash_redirect(&form_route, "error", message).into_response());
    }

    match state
        .api()
        .update_product(user.bearer(), &id, fields, image)
        .await
    {
        Ok(()) => {
            Ok(flash_redirect("/admin/products", "success", "Product updated").into_response())
        }
        Err(ApiError::Rejected { message, .. }) => {
            Ok(flash_redirect(&form_route, "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product.
#[instrument(skip_all, fields(id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    match state.api().delete_product(user.bearer(), &id).await {
        Ok(()) => Ok(flash_redirect(
            "/admin/products",
            "success",
            "Product deleted",
        )),
        Err(ApiError::Rejected { message, .. }) => {
            Ok(flash_redirect("/admin/products", "error", &message))
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Form handling
// =============================================================================

/// Read the product multipart form into API inputs.
async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(ProductFields, Option<ImageUpload>)> {
    let mut title = String::new();
    let mut description = String::new();
    let mut category = String::new();
    let mut price = String::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = read_text(field).await?,
            "description" => description = read_text(field).await?,
            "category" => category = read_text(field).await?,
            "price" => price = read_text(field).await?,
            "image" => {
                let file_name = field.file_name().map(ToString::to_string);
                let content_type = field
                    .content_type()
                    .map_or_else(|| "application/octet-stream".to_string(), ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                // An empty file input still submits a part; skip it
                if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                    if !bytes.is_empty() {
                        image = Some(ImageUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    Ok((
        ProductFields {
            title,
            description,
            category,
            price,
        },
        image,
    ))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Validate the form before forwarding to the backend.
fn validate_fields(fields: &ProductFields) -> std::result::Result<(), &'static str> {
    if fields.title.trim().is_empty() {
        return Err("Title is required");
    }
    if fields.category.trim().is_empty() {
        return Err("Category is required");
    }
    match fields.price.trim().parse::<Decimal>() {
        Ok(price) if price > Decimal::ZERO => Ok(()),
        _ => Err("Price must be a positive number"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, category: &str, price: &str) -> ProductFields {
        ProductFields {
            title: title.to_string(),
            description: String::new(),
            category: category.to_string(),
            price: price.to_string(),
        }
    }

    #[test]
    fn test_validate_fields_accepts_valid_input() {
        assert!(validate_fields(&fields("Mouse", "mouse", "799")).is_ok());
        assert!(validate_fields(&fields("Mouse", "mouse", "799.50")).is_ok());
    }

    #[test]
    fn test_validate_fields_rejects_bad_input() {
        assert!(validate_fields(&fields("", "mouse", "799")).is_err());
        assert!(validate_fields(&fields("Mouse", "", "799")).is_err());
        assert!(validate_fields(&fields("Mouse", "mouse", "free")).is_err());
        assert!(validate_fields(&fields("Mouse", "mouse", "-5")).is_err());
        assert!(validate_fields(&fields("Mouse", "mouse", "0")).is_err());
    }
}
