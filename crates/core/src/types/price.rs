//! Minor-unit price representation.
//!
//! Prices are stored as whole Colombian pesos (the currency has no
//! fractional display in practice) and formatted es-CO style with `.` as
//! the thousands separator: `Price::new(125_000)` displays as `$125.000`.

use serde::{Deserialize, Serialize};

/// A price in currency minor units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0);

    /// Create a new price from minor units.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Whether this is a positive, displayable price.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiply by a line-item quantity, saturating on overflow.
    #[must_use]
    pub const fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Add two prices, saturating on overflow.
    #[must_use]
    pub const fn plus(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::fmt::Display for Price {
    /// Formats es-CO style: `$` prefix, `.` thousands separator.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let negative = self.0 < 0;
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if negative {
            write!(f, "-${grouped}")
        } else {
            write!(f, "${grouped}")
        }
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc.plus(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_grouping() {
        assert_eq!(Price::new(0).to_string(), "$0");
        assert_eq!(Price::new(950).to_string(), "$950");
        assert_eq!(Price::new(1_000).to_string(), "$1.000");
        assert_eq!(Price::new(20_000).to_string(), "$20.000");
        assert_eq!(Price::new(125_000).to_string(), "$125.000");
        assert_eq!(Price::new(1_250_000).to_string(), "$1.250.000");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Price::new(-15_000).to_string(), "-$15.000");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::new(10_000);
        assert_eq!(unit.times(2), Price::new(20_000));

        let total: Price = [Price::new(20_000), Price::new(5_500)].into_iter().sum();
        assert_eq!(total, Price::new(25_500));
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Price::new(89_900)).unwrap();
        assert_eq!(json, "89900");
        let back: Price = serde_json::from_str("89900").unwrap();
        assert_eq!(back, Price::new(89_900));
    }
}
