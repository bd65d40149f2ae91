//! Status enums shared with the commerce backend.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Matches the status values the backend stores on an order. Admins may move
/// an order to any status; the progression below is the usual lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// All statuses, in lifecycle order. Used to render the admin status
    /// selector and the order-history timeline.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Approved,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment method selected at checkout.
///
/// Only cash-on-delivery is live; the online options are rendered disabled
/// in the payment selector (gateway integration is intentionally stubbed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Upi,
    Card,
}

impl PaymentMethod {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cod => "Cash on Delivery",
            Self::Upi => "UPI / Razorpay",
            Self::Card => "Card",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "cod"),
            Self::Upi => write!(f, "upi"),
            Self::Card => write!(f, "card"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_status_round_trip() {
        for status in OrderStatus::ALL {
            let parsed = OrderStatus::from_str(&status.to_string()).expect("round trip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_order_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipped).expect("serialize"),
            "\"shipped\""
        );
        let status: OrderStatus = serde_json::from_str("\"delivered\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(OrderStatus::from_str("cancelled").is_err());
    }

    #[test]
    fn test_payment_method_wire_values() {
        assert_eq!(PaymentMethod::Cod.to_string(), "cod");
        let method: PaymentMethod = serde_json::from_str("\"upi\"").expect("deserialize");
        assert_eq!(method, PaymentMethod::Upi);
    }
}
