//! Dashboard analytics derived from raw orders.
//!
//! The backend exposes no aggregation endpoints; the admin dashboard derives
//! everything from the full order list. Pure functions so the derivations
//! are testable without a backend; chart rendering belongs to the templates.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;

use voltcart_core::{OrderStatus, Price};

use crate::api::types::Order;

/// Days of history shown in the revenue series.
const REVENUE_WINDOW_DAYS: i64 = 30;

/// How many products the "top products" list keeps.
const TOP_PRODUCTS: usize = 5;

/// Count of orders in one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// Revenue and order count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Price,
    pub order_count: usize,
}

/// Units sold for one product title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProduct {
    pub title: String,
    pub total_quantity: u32,
}

/// Headline numbers for the stat tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total_orders: usize,
    pub pending_orders: usize,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Orders per status, lifecycle order, absent statuses omitted.
    pub by_status: Vec<StatusCount>,
    /// Trailing 30 days, ascending by date, empty days omitted.
    pub daily_revenue: Vec<DailyRevenue>,
    /// Top products by units sold, at most five.
    pub top_products: Vec<TopProduct>,
    pub summary: Summary,
}

/// Derive the dashboard series from raw orders.
///
/// `now` anchors the revenue window so the derivation is deterministic
/// under test.
#[must_use]
pub fn derive(orders: &[Order], now: DateTime<Utc>) -> Dashboard {
    Dashboard {
        by_status: by_status(orders),
        daily_revenue: daily_revenue(orders, now),
        top_products: top_products(orders),
        summary: summary(orders),
    }
}

fn by_status(orders: &[Order]) -> Vec<StatusCount> {
    let mut counts: HashMap<OrderStatus, usize> = HashMap::new();
    for order in orders {
        *counts.entry(order.status).or_insert(0) += 1;
    }

    OrderStatus::ALL
        .into_iter()
        .filter_map(|status| {
            counts.get(&status).map(|&count| StatusCount { status, count })
        })
        .collect()
}

fn daily_revenue(orders: &[Order], now: DateTime<Utc>) -> Vec<DailyRevenue> {
    let cutoff = now - Duration::days(REVENUE_WINDOW_DAYS);

    let mut days: HashMap<NaiveDate, (Price, usize)> = HashMap::new();
    for order in orders.iter().filter(|o| o.created_at >= cutoff) {
        let day = order.created_at.date_naive();
        let entry = days.entry(day).or_insert((Price::ZERO, 0));
        entry.0 = entry.0 + order.total();
        entry.1 += 1;
    }

    let mut series: Vec<DailyRevenue> = days
        .into_iter()
        .map(|(date, (revenue, order_count))| DailyRevenue {
            date,
            revenue,
            order_count,
        })
        .collect();
    series.sort_by_key(|d| d.date);
    series
}

fn top_products(orders: &[Order]) -> Vec<TopProduct> {
    let mut quantities: HashMap<String, u32> = HashMap::new();
    for order in orders {
        for line in &order.products {
            let title = line
                .product
                .as_ref()
                .map_or("Unknown", |p| p.title.as_str());
            *quantities.entry(title.to_string()).or_insert(0) += line.quantity;
        }
    }

    let mut ranked: Vec<TopProduct> = quantities
        .into_iter()
        .map(|(title, total_quantity)| TopProduct {
            title,
            total_quantity,
        })
        .collect();
    // Quantity descending, title ascending for a stable order
    ranked.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.title.cmp(&b.title))
    });
    ranked.truncate(TOP_PRODUCTS);
    ranked
}

fn summary(orders: &[Order]) -> Summary {
    Summary {
        total_orders: orders.len(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn order(status: &str, created_at: &str, lines: &[(&str, u32, i64)]) -> Order {
        let products: Vec<serde_json::Value> = lines
            .iter()
            .map(|(title, quantity, price)| {
                json!({
                    "productId": {
                        "_id": format!("id-{title}"),
                        "title": title,
                        "category": "electronics",
                        "price": price,
                    },
                    "quantity": quantity,
                })
            })
            .collect();

        serde_json::from_value(json!({
            "_id": "o1",
            "products": products,
            "paymentMethod": "cod",
            "status": status,
            "createdAt": created_at,
        }))
        .expect("order fixture")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).single().expect("timestamp")
    }

    #[test]
    fn test_by_status_counts_in_lifecycle_order() {
        let orders = vec![
            order("delivered", "2026-07-30T10:00:00Z", &[("Mouse", 1, 799)]),
            order("pending", "2026-07-30T11:00:00Z", &[("Mouse", 1, 799)]),
            order("pending", "2026-07-30T12:00:00Z", &[("Mouse", 1, 799)]),
        ];
        let dashboard = derive(&orders, now());

        assert_eq!(
            dashboard.by_status,
            vec![
                StatusCount { status: OrderStatus::Pending, count: 2 },
                StatusCount { status: OrderStatus::Delivered, count: 1 },
            ]
        );
        assert_eq!(dashboard.summary.total_orders, 3);
        assert_eq!(dashboard.summary.pending_orders, 2);
    }

    #[test]
    fn test_daily_revenue_window_and_grouping() {
        let orders = vec![
            // Two orders on the same recent day
            order("pending", "2026-07-30T09:00:00Z", &[("Mouse", 2, 799)]),
            order("approved", "2026-07-30T18:00:00Z", &[("Keyboard", 1, 1499)]),
            // A different recent day
            order("pending", "2026-07-31T09:00:00Z", &[("Mouse", 1, 799)]),
            // Outside the 30-day window: ignored
            order("delivered", "2026-06-01T09:00:00Z", &[("TV", 1, 49_999)]),
        ];
        let dashboard = derive(&orders, now());

        assert_eq!(dashboard.daily_revenue.len(), 2);
        let first = &dashboard.daily_revenue[0];
        assert_eq!(first.date.to_string(), "2026-07-30");
        assert_eq!(first.revenue.amount(), Decimal::from(799 * 2 + 1499));
        assert_eq!(first.order_count, 2);
        let second = &dashboard.daily_revenue[1];
        assert_eq!(second.date.to_string(), "2026-07-31");
        assert_eq!(second.order_count, 1);
    }

    #[test]
    fn test_top_products_ranked_and_truncated() {
        let orders = vec![
            order(
                "pending",
                "2026-07-30T09:00:00Z",
                &[
                    ("Mouse", 5, 799),
                    ("Keyboard", 3, 1499),
                    ("Webcam", 3, 2499),
                    ("Monitor", 2, 10_999),
                    ("Speaker", 1, 1999),
                    ("Charger", 1, 599),
                ],
            ),
        ];
        let dashboard = derive(&orders, now());

        assert_eq!(dashboard.top_products.len(), 5);
        assert_eq!(dashboard.top_products[0].title, "Mouse");
        assert_eq!(dashboard.top_products[0].total_quantity, 5);
        // Tie between Keyboard and Webcam resolves alphabetically
        assert_eq!(dashboard.top_products[1].title, "Keyboard");
        assert_eq!(dashboard.top_products[2].title, "Webcam");
    }

    #[test]
    fn test_deleted_products_count_as_unknown() {
        let orders = vec![serde_json::from_value(json!({
            "_id": "o2",
            "products": [{"productId": null, "quantity": 4}],
            "status": "pending",
            "createdAt": "2026-07-30T09:00:00Z",
        }))
        .expect("order fixture")];

        let dashboard = derive(&orders, now());
        assert_eq!(dashboard.top_products[0].title, "Unknown");
        assert_eq!(dashboard.top_products[0].total_quantity, 4);
        // Deleted products contribute no revenue
        assert!(dashboard.daily_revenue[0].revenue.amount().is_zero());
    }

    #[test]
    fn test_empty_orders() {
        let dashboard = derive(&[], now());
        assert!(dashboard.by_status.is_empty());
        assert!(dashboard.daily_revenue.is_empty());
        assert!(dashboard.top_products.is_empty());
        assert_eq!(dashboard.summary, Summary::default());
    }
}
