//! Wire types for the commerce backend REST API.
//!
//! Field names mirror the backend's JSON exactly (Mongo-style `_id`,
//! camelCase keys); serde renames keep the Rust side idiomatic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voltcart_core::{
    AddressId, CartItemId, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId,
};

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Price,
    /// Image file name, served by the backend under `/uploads/`.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A line in the signed-in user's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
    /// Unit price captured when the item was added.
    pub price: Price,
    /// `price * quantity`, maintained by the backend.
    pub total_price: Price,
}

/// A shipping address owned by the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

/// Address fields submitted on create/update (no `_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

/// Owner summary populated onto admin order listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUser {
    #[serde(rename = "_id", default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl OrderUser {
    /// Best display name for the order's owner.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Unknown")
    }
}

/// One product line on an order.
///
/// `product` is populated by the backend; it can be null when the product
/// was deleted after the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(rename = "productId", default)]
    pub product: Option<Product>,
    pub quantity: u32,
}

impl OrderLine {
    /// Line total, zero when the product no longer exists.
    #[must_use]
    pub fn total(&self) -> Price {
        self.product
            .as_ref()
            .map_or(Price::ZERO, |p| p.price.times(self.quantity))
    }
}

/// An order as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Populated on admin listings; absent on `my-orders`.
    #[serde(rename = "userId", default)]
    pub user: Option<OrderUser>,
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.products.iter().map(OrderLine::total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.products.iter().map(|line| line.quantity).sum()
    }
}

/// One product reference when placing an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Successful login/registration body.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Generic `{"message": ...}` body the backend uses for errors and
/// token-less successes.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    // Captured from the backend's actual response shapes.
    const PRODUCT_JSON: &str = r#"{
        "_id": "64f0c2a19b1d8e0012ab34cd",
        "title": "Wireless Mouse",
        "description": "2.4 GHz, 1600 dpi",
        "category": "mouse",
        "price": 799,
        "image": "mouse-64f0.png",
        "createdAt": "2026-07-01T10:15:00.000Z"
    }"#;

    const ORDER_JSON: &str = r#"{
        "_id": "66a1b2c3d4e5f60012aabbcc",
        "userId": {"_id": "u1", "username": "asha", "email": "asha@example.com"},
        "products": [
            {"productId": {
                "_id": "64f0c2a19b1d8e0012ab34cd",
                "title": "Wireless Mouse",
                "category": "mouse",
                "price": 799
            }, "quantity": 2},
            {"productId": null, "quantity": 1}
        ],
        "shippingAddress": {
            "_id": "a1",
            "fullName": "Asha Rao",
            "address": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001",
            "phone": "9800000000"
        },
        "paymentMethod": "cod",
        "status": "pending",
        "createdAt": "2026-07-02T08:00:00.000Z"
    }"#;

    #[test]
    fn test_product_deserializes() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).expect("deserialize");
        assert_eq!(product.id.as_str(), "64f0c2a19b1d8e0012ab34cd");
        assert_eq!(product.price.amount(), Decimal::from(799));
        assert_eq!(product.image.as_deref(), Some("mouse-64f0.png"));
    }

    #[test]
    fn test_order_totals_skip_deleted_products() {
        let order: Order = serde_json::from_str(ORDER_JSON).expect("deserialize");
        // 2 × 799 from the surviving line, nothing from the deleted product
        assert_eq!(order.total().amount(), Decimal::from(1598));
        assert_eq!(order.unit_count(), 3);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            order.user.expect("populated user").display_name(),
            "asha"
        );
    }

    #[test]
    fn test_order_user_falls_back_to_email() {
        let user: OrderUser =
            serde_json::from_str(r#"{"email": "x@example.com"}"#).expect("deserialize");
        assert_eq!(user.display_name(), "x@example.com");
        assert_eq!(OrderUser::default().display_name(), "Unknown");
    }

    #[test]
    fn test_order_line_input_wire_shape() {
        let line = OrderLineInput {
            product_id: ProductId::new("p1"),
            quantity: 2,
        };
        let json = serde_json::to_value(&line).expect("serialize");
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["quantity"], 2);
    }
}
