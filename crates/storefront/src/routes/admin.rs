//! Admin route handlers: dashboard analytics and order management.
//!
//! Every handler requires the admin role via `RequireAdmin`; the backend
//! additionally enforces admin on its side, so a forged role claim gets a
//! 401/403 that the unauthorized interceptor turns into a login redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use voltcart_core::{OrderId, OrderStatus};

use crate::api::ApiError;
use crate::api::types::Order;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::{MessageQuery, NavContext, flash_redirect};
use crate::services::analytics::{self, Dashboard};
use crate::state::AppState;

/// One order row in the management table.
#[derive(Debug, Clone)]
pub struct AdminOrderView {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer: String,
    pub customer_email: Option<String>,
    pub item_count: usize,
    pub total: String,
    pub status: OrderStatus,
}

impl AdminOrderView {
    fn from_order(order: &Order) -> Self {
        let (customer, customer_email) = order.user.as_ref().map_or_else(
            || ("Unknown".to_string(), None),
            |u| (u.display_name().to_string(), u.email.clone()),
        );

        Self {
            id: order.id.to_string(),
            created_at: order.created_at,
            customer,
            customer_email,
            item_count: order.products.len(),
            total: order.total().display(),
            status: order.status,
        }
    }
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub nav: NavContext,
    pub dashboard: Dashboard,
}

/// Order management page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct AdminOrdersTemplate {
    pub nav: NavContext,
    pub orders: Vec<AdminOrderView>,
    pub statuses: &'static [OrderStatus],
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the analytics dashboard.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> Result<DashboardTemplate> {
    let orders = state.api().all_orders(user.bearer()).await?;
    let dashboard = analytics::derive(&orders, Utc::now());

    Ok(DashboardTemplate {
        nav: NavContext::for_session(Some(&user)),
        dashboard,
    })
}

/// Display all orders with status controls, newest first.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(message): Query<MessageQuery>,
) -> Result<AdminOrdersTemplate> {
    let mut orders = state.api().all_orders(user.bearer()).await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(AdminOrdersTemplate {
        nav: NavContext::for_session(Some(&user)),
        orders: orders.iter().map(AdminOrderView::from_order).collect(),
        statuses: &OrderStatus::ALL,
        error: message.error,
        success: message.success,
    })
}

/// Set an order's status.
#[instrument(skip_all, fields(id = %id, status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    match state
        .api()
        .update_order_status(user.bearer(), &id, form.status)
        .await
    {
        Ok(stored) => Ok(flash_redirect(
            "/admin/orders",
            "success",
            &format!("Order status set to {}", stored.label()),
        )
        .into_response()),
        Err(ApiError::Rejected { message, .. }) => {
            Ok(flash_redirect("/admin/orders", "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
