//! Canonical food records
//!
//! [`FoodRecord`] is the source-agnostic shape every external response is
//! normalized into; [`RankedFoodRecord`] is what the ranker hands back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when a product exposes no usable name
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Unit a serving size has been normalized to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServingUnit {
    /// Grams (solid products)
    #[serde(rename = "g")]
    Grams,
    /// Milliliters (liquids)
    #[serde(rename = "ml")]
    Milliliters,
}

impl ServingUnit {
    /// Short unit symbol
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Grams => "g",
            Self::Milliliters => "ml",
        }
    }
}

impl fmt::Display for ServingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Nutrient values per 100 g (or 100 ml).
///
/// A missing value is `None`; values are never `NaN` or infinite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutriments {
    /// Energy in kcal
    pub calories: Option<f64>,
    /// Protein in g
    pub protein: Option<f64>,
    /// Carbohydrates in g
    pub carbs: Option<f64>,
    /// Fat in g
    pub fat: Option<f64>,
    /// Fiber in g
    pub fiber: Option<f64>,
    /// Sugar in g
    pub sugar: Option<f64>,
    /// Sodium in g
    pub sodium: Option<f64>,
}

impl Nutriments {
    /// Whether no nutrient value is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein.is_none()
            && self.carbs.is_none()
            && self.fat.is_none()
            && self.fiber.is_none()
            && self.sugar.is_none()
            && self.sodium.is_none()
    }
}

/// Normalized product record.
///
/// Created once per API response item and never mutated afterwards; use
/// [`FoodRecord::with_usage_count`] to derive a copy carrying popularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Barcode or source key
    pub identifier: String,
    /// Display name, never empty
    pub source_name: String,
    /// Name in the configured secondary language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    /// First listed brand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Every known name variant, deduplicated case-insensitively
    #[serde(default)]
    pub search_aliases: Vec<String>,
    /// Nutrition facts per 100 g or 100 ml
    #[serde(default)]
    pub nutriments: Nutriments,
    /// Serving amount in `serving_unit`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<f64>,
    /// Unit of `serving_size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_unit: Option<ServingUnit>,
    /// Nutri-Score grade (a-e)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutriscore: Option<String>,
    /// NOVA processing group (1-4)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nova_group: Option<u8>,
    /// Eco-Score grade (a-e)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecoscore: Option<String>,
    /// How often the user picked this item before; supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u32>,
}

impl FoodRecord {
    /// Create a record with only an identifier and a name.
    ///
    /// A blank name is replaced by [`UNKNOWN_PRODUCT_NAME`].
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let source_name = if name.trim().is_empty() {
            UNKNOWN_PRODUCT_NAME.to_string()
        } else {
            name.trim().to_string()
        };

        Self {
            identifier: identifier.into(),
            search_aliases: vec![source_name.clone()],
            source_name,
            localized_name: None,
            brand: None,
            nutriments: Nutriments::default(),
            serving_size: None,
            serving_unit: None,
            nutriscore: None,
            nova_group: None,
            ecoscore: None,
            usage_count: None,
        }
    }

    /// Builder-style method to set the localized name
    #[must_use]
    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    /// Builder-style method to set the brand
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Copy of this record carrying the caller's usage count
    #[must_use]
    pub fn with_usage_count(mut self, count: u32) -> Self {
        self.usage_count = Some(count);
        self
    }

    /// Usage count with unset treated as zero
    #[must_use]
    pub fn usage(&self) -> u32 {
        self.usage_count.unwrap_or(0)
    }

    /// Serving size rendered as e.g. `"30 g"`
    #[must_use]
    pub fn serving_label(&self) -> Option<String> {
        match (self.serving_size, self.serving_unit) {
            (Some(size), Some(unit)) => Some(format!("{size} {unit}")),
            _ => None,
        }
    }
}

/// Rule that produced a candidate's winning field score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Field equals the query
    Exact,
    /// Field starts with the query
    StartsWith,
    /// A word in the field starts with the query
    WordMatch,
    /// Query appears anywhere in the field
    Contains,
    /// Query matches the brand only
    BrandMatch,
    /// Close enough by edit distance
    Fuzzy,
}

impl MatchType {
    /// Snake-case label
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::StartsWith => "starts_with",
            Self::WordMatch => "word_match",
            Self::Contains => "contains",
            Self::BrandMatch => "brand_match",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A food record scored against a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFoodRecord {
    /// The scored record
    #[serde(flatten)]
    pub record: FoodRecord,
    /// Relevance in 0..=100
    pub relevance_score: u8,
    /// Rule behind `relevance_score`
    pub match_type: MatchType,
    /// Character offset of the winning match within its field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_position: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_uses_placeholder() {
        let record = FoodRecord::new("4000417025005", "   ");
        assert_eq!(record.source_name, UNKNOWN_PRODUCT_NAME);
        assert_eq!(record.search_aliases, vec![UNKNOWN_PRODUCT_NAME.to_string()]);
    }

    #[test]
    fn test_usage_defaults_to_zero() {
        let record = FoodRecord::new("1", "Apfel");
        assert_eq!(record.usage(), 0);
        assert_eq!(record.with_usage_count(4).usage(), 4);
    }

    #[test]
    fn test_serving_label() {
        let mut record = FoodRecord::new("1", "Milch");
        assert!(record.serving_label().is_none());

        record.serving_size = Some(250.0);
        record.serving_unit = Some(ServingUnit::Milliliters);
        assert_eq!(record.serving_label().as_deref(), Some("250 ml"));
    }

    #[test]
    fn test_ranked_record_serializes_flat() {
        let ranked = RankedFoodRecord {
            record: FoodRecord::new("1", "Apfel").with_brand("Bio"),
            relevance_score: 100,
            match_type: MatchType::Exact,
            match_position: Some(0),
        };

        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["source_name"], "Apfel");
        assert_eq!(json["match_type"], "exact");
        assert_eq!(json["relevance_score"], 100);
        assert!(json.get("localized_name").is_none());
    }

    #[test]
    fn test_nutriments_empty() {
        assert!(Nutriments::default().is_empty());
        let n = Nutriments {
            protein: Some(1.0),
            ..Nutriments::default()
        };
        assert!(!n.is_empty());
    }
}
