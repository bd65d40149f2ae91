//! Order history for the signed-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use tracing::instrument;

use voltcart_core::OrderStatus;

use crate::api::ApiClient;
use crate::api::types::Order;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::{MessageQuery, NavContext};
use crate::state::AppState;

/// One line of an order as displayed.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub title: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub line_total: String,
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub payment_label: &'static str,
    pub lines: Vec<OrderLineView>,
    pub total: String,
    pub ship_to: Option<String>,
}

impl OrderView {
    /// Build the view for one order.
    #[must_use]
    pub fn from_order(order: &Order, api: &ApiClient) -> Self {
        Self {
            id: order.id.to_string(),
            created_at: order.created_at,
            status: order.status,
            payment_label: order.payment_method.label(),
            lines: order
                .products
                .iter()
                .map(|line| OrderLineView {
                    title: line
                        .product
                        .as_ref()
                        .map_or_else(|| "Unknown".to_string(), |p| p.title.clone()),
                    image_url: line
                        .product
                        .as_ref()
                        .and_then(|p| p.image.as_deref())
                        .map(|f| api.image_url(f)),
                    quantity: line.quantity,
                    line_total: line.total().display(),
                })
                .collect(),
            total: order.total().display(),
            ship_to: order.shipping_address.as_ref().map(|a| {
                format!(
                    "{}, {}, {}, {} - {}",
                    a.full_name, a.address, a.city, a.state, a.pincode
                )
            }),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub nav: NavContext,
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the signed-in user's orders, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(message): Query<MessageQuery>,
) -> Result<OrdersTemplate> {
    let mut orders = state.api().my_orders(user.bearer()).await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(OrdersTemplate {
        nav: NavContext::for_session(Some(&user)),
        orders: orders
            .iter()
            .map(|o| OrderView::from_order(o, state.api()))
            .collect(),
        error: message.error,
        success: message.success,
    })
}
