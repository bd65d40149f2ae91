//! REST client for the commerce backend.

use reqwest::{Response, StatusCode, multipart};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use voltcart_core::{AddressId, CartItemId, OrderId, OrderStatus, PaymentMethod, ProductId};

use crate::api::ApiError;
use crate::api::types::{
    Address, AddressInput, ApiMessage, CartItem, Order, OrderLineInput, Product, TokenResponse,
};

/// Client for the commerce backend REST API.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
}

/// Query parameters for the product listing.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Text fields for product create/update (multipart form).
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
}

/// An uploaded product image forwarded to the backend.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Outcome of a registration attempt.
///
/// The backend either issues a token immediately or answers with a message
/// and expects the email to be verified with an OTP first.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterOutcome {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiClient {
    /// Create a new backend client from the configured base URL.
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Public URL of a product image stored by the backend.
    #[must_use]
    pub fn image_url(&self, file_name: &str) -> String {
        format!("{}/uploads/{file_name}", self.base)
    }

    // =========================================================================
    // Response handling
    // =========================================================================

    /// Map a non-success response to the error taxonomy.
    ///
    /// `authed` marks calls carrying the session credential: only those may
    /// produce [`ApiError::Unauthorized`] (an auth-entry call answering 401
    /// means "wrong password", not "session expired").
    async fn check_status(response: Response, authed: bool) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if authed && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN) {
            return Err(ApiError::Unauthorized);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(response.url().path().to_string()));
        }

        let message = response
            .json::<ApiMessage>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("request failed with status {status}"));

        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        authed: bool,
    ) -> Result<T, ApiError> {
        let response = Self::check_status(response, authed).await?;
        Ok(response.json::<T>().await?)
    }

    async fn read_unit(response: Response, authed: bool) -> Result<(), ApiError> {
        Self::check_status(response, authed).await?;
        Ok(())
    }

    // =========================================================================
    // Auth (unauthenticated entry points)
    // =========================================================================

    /// Exchange credentials for a bearer token.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::read_json(response, false).await
    }

    /// Create an account. May return a token directly or require OTP
    /// verification first.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterOutcome, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await?;
        Self::read_json(response, false).await
    }

    /// Confirm a registration with the emailed OTP.
    pub async fn verify_registration(&self, email: &str, otp: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/verify-registration"))
            .json(&json!({ "email": email, "otp": otp }))
            .send()
            .await?;
        Self::read_unit(response, false).await
    }

    /// Request a password-reset OTP.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/forgot-password"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        Self::read_unit(response, false).await
    }

    /// Check a password-reset OTP without consuming it.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/verify-otp"))
            .json(&json!({ "email": email, "otp": otp }))
            .send()
            .await?;
        Self::read_unit(response, false).await
    }

    /// Set a new password using a verified OTP.
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/reset-password"))
            .json(&json!({ "email": email, "otp": otp, "newPassword": new_password }))
            .send()
            .await?;
        Self::read_unit(response, false).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, optionally filtered/sorted by the backend.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/products"))
            .query(query)
            .send()
            .await?;
        Self::read_json(response, false).await
    }

    /// Fetch a single product.
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/products/{id}")))
            .send()
            .await?;
        Self::read_json(response, false).await
    }

    /// Create a product (admin). Image is forwarded as a multipart file.
    #[instrument(skip_all, fields(title = %fields.title))]
    pub async fn create_product(
        &self,
        token: &str,
        fields: ProductFields,
        image: Option<ImageUpload>,
    ) -> Result<(), ApiError> {
        let form = Self::product_form(fields, image)?;
        let response = self
            .client
            .post(self.endpoint("/addProducts"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    /// Update a product (admin). A missing image keeps the stored one.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn update_product(
        &self,
        token: &str,
        id: &ProductId,
        fields: ProductFields,
        image: Option<ImageUpload>,
    ) -> Result<(), ApiError> {
        let form = Self::product_form(fields, image)?;
        let response = self
            .client
            .put(self.endpoint(&format!("/updateProduct/{id}")))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    /// Delete a product (admin).
    pub async fn delete_product(&self, token: &str, id: &ProductId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/deleteProduct/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    fn product_form(
        fields: ProductFields,
        image: Option<ImageUpload>,
    ) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new()
            .text("title", fields.title)
            .text("description", fields.description)
            .text("category", fields.category)
            .text("price", fields.price);

        if let Some(upload) = image {
            let part = multipart::Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(&upload.content_type)?;
            form = form.part("image", part);
        }

        Ok(form)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the session user's cart.
    pub async fn cart(&self, token: &str) -> Result<Vec<CartItem>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/cart"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, true).await
    }

    /// Add one unit of a product to the cart.
    pub async fn add_to_cart(&self, token: &str, product_id: &ProductId) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/cart"))
            .bearer_auth(token)
            .json(&json!({ "productId": product_id }))
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    /// Set the quantity of a cart line.
    pub async fn update_cart_item(
        &self,
        token: &str,
        id: &CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.endpoint(&format!("/cart/{id}")))
            .bearer_auth(token)
            .json(&json!({ "quantity": quantity }))
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    /// Remove a cart line.
    pub async fn remove_cart_item(&self, token: &str, id: &CartItemId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/cart/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List the session user's shipping addresses.
    pub async fn addresses(&self, token: &str) -> Result<Vec<Address>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/address"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, true).await
    }

    /// Create a shipping address.
    pub async fn create_address(
        &self,
        token: &str,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/address"))
            .bearer_auth(token)
            .json(input)
            .send()
            .await?;
        Self::read_json(response, true).await
    }

    /// Update a shipping address.
    pub async fn update_address(
        &self,
        token: &str,
        id: &AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        let response = self
            .client
            .put(self.endpoint(&format!("/address/{id}")))
            .bearer_auth(token)
            .json(input)
            .send()
            .await?;
        Self::read_json(response, true).await
    }

    /// Delete a shipping address.
    pub async fn delete_address(&self, token: &str, id: &AddressId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/address/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order from the given lines and shipping address.
    #[instrument(skip_all, fields(lines = products.len()))]
    pub async fn place_order(
        &self,
        token: &str,
        products: &[OrderLineInput],
        shipping_address: &Address,
        payment_method: PaymentMethod,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/order"))
            .bearer_auth(token)
            .json(&json!({
                "products": products,
                "shippingAddress": shipping_address,
                "paymentMethod": payment_method,
            }))
            .send()
            .await?;
        Self::read_unit(response, true).await
    }

    /// All orders, with owner populated (admin only; the backend enforces).
    pub async fn all_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/order"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, true).await
    }

    /// The session user's own orders.
    pub async fn my_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/order/my-orders"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, true).await
    }

    /// Set an order's status (admin). Returns the status the backend stored.
    #[instrument(skip_all, fields(id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        token: &str,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, ApiError> {
        #[derive(Deserialize)]
        struct StatusBody {
            status: OrderStatus,
        }

        let response = self
            .client
            .put(self.endpoint(&format!("/order/{id}/status")))
            .bearer_auth(token)
            .json(&json!({ "status": status }))
            .send()
            .await?;
        let body: StatusBody = Self::read_json(response, true).await?;
        Ok(body.status)
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Probe backend reachability (used by the readiness endpoint).
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.endpoint("/products")).send().await?;
        debug!(status = %response.status(), "backend ping");
        Self::read_unit(response, false).await
    }
}
