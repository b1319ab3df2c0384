//! Catalog classification enums.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level product category.
///
/// The storefront exposes one browse page per category; the external API
/// uses the lowercase name as the path segment (`/products/category/women`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Women,
    Men,
    Accessories,
}

impl Category {
    /// All categories, in storefront navigation order.
    pub const ALL: [Self; 3] = [Self::Women, Self::Men, Self::Accessories];

    /// The lowercase API path segment for this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Women => "women",
            Self::Men => "men",
            Self::Accessories => "accessories",
        }
    }

    /// Human-readable label for page headings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Women => "Women",
            Self::Men => "Men",
            Self::Accessories => "Accessories",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a category from a path segment.
#[derive(Debug, Error)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(String);

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "women" => Ok(Self::Women),
            "men" => Ok(Self::Men),
            "accessories" => Ok(Self::Accessories),
            other => Err(CategoryParseError(other.to_owned())),
        }
    }
}

/// Promotional tag rendered as a badge on product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
    New,
    Sale,
    Exclusive,
    BestSeller,
}

impl Badge {
    /// Human-readable label for the badge pill.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Sale => "Sale",
            Self::Exclusive => "Exclusive",
            Self::BestSeller => "Best seller",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_str(cat.as_str()).unwrap(), cat);
        }
        assert!(Category::from_str("shoes").is_err());
    }

    #[test]
    fn test_category_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Category::Accessories).unwrap(),
            "\"accessories\""
        );
    }

    #[test]
    fn test_badge_serde_kebab() {
        assert_eq!(
            serde_json::to_string(&Badge::BestSeller).unwrap(),
            "\"best-seller\""
        );
    }
}
