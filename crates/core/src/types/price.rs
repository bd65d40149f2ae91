//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the store's single currency (INR).
///
/// Wraps a [`Decimal`] so cart and order math never touches floating point.
/// The backend sends plain JSON numbers; `rust_decimal`'s serde support
/// accepts both numeric and string forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity (e.g., a cart line total).
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display with the rupee sign, e.g. `₹1299.00`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("₹{:.2}", self.0)
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_display_two_decimal_places() {
        let price = Price::new(Decimal::new(129_950, 2));
        assert_eq!(price.display(), "₹1299.50");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::new(Decimal::from(250));
        let line = unit.times(3);
        assert_eq!(line.amount(), Decimal::from(750));

        let total: Price = [unit, line].into_iter().sum();
        assert_eq!(total.amount(), Decimal::from(1000));
    }

    #[test]
    fn test_deserialize_from_number() {
        let price: Price = serde_json::from_str("1499").expect("deserialize");
        assert_eq!(price.amount(), Decimal::from(1499));
    }
}
