//! Product categories for recorded sales.

use serde::{Deserialize, Serialize};

/// The fixed set of product categories with dedicated commission rates.
///
/// Unrecognized category strings fall back to the default rate; that
/// fallback is handled (and logged) by the ledger, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Products,
    Services,
    Courses,
}

impl ProductCategory {
    /// Parse a category string. Returns `None` for unrecognized categories.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "products" => Some(Self::Products),
            "services" => Some(Self::Services),
            "courses" => Some(Self::Courses),
            _ => None,
        }
    }

    /// Canonical string form, as stored in the sales ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Services => "services",
            Self::Courses => "courses",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_categories() {
        assert_eq!(ProductCategory::parse("products"), Some(ProductCategory::Products));
        assert_eq!(ProductCategory::parse("services"), Some(ProductCategory::Services));
        assert_eq!(ProductCategory::parse("courses"), Some(ProductCategory::Courses));
    }

    #[test]
    fn test_parse_unknown_category() {
        assert_eq!(ProductCategory::parse("subscriptions"), None);
        assert_eq!(ProductCategory::parse(""), None);
    }

    #[test]
    fn test_round_trip() {
        for cat in [
            ProductCategory::Products,
            ProductCategory::Services,
            ProductCategory::Courses,
        ] {
            assert_eq!(ProductCategory::parse(cat.as_str()), Some(cat));
        }
    }
}
