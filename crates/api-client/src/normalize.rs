//! Normalization of raw Open Food Facts products into [`FoodRecord`]s.

use crate::serving::parse_serving_size;
use nutritrack_core::food::{FoodRecord, Nutriments, UNKNOWN_PRODUCT_NAME};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

const KJ_PER_KCAL: f64 = 4.184;
const SALT_PER_SODIUM: f64 = 2.5;

/// Product object as returned by the product and search endpoints.
///
/// Only the fields used for normalization are typed; localized variants
/// such as `product_name_de` end up in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    /// Barcode, sometimes sent as a number
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub abbreviated_product_name: Option<String>,
    /// Comma-separated brand list
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub serving_size: Option<Value>,
    #[serde(default)]
    pub nutriscore_grade: Option<String>,
    #[serde(default)]
    pub nova_group: Option<Value>,
    #[serde(default)]
    pub ecoscore_grade: Option<String>,
    #[serde(default)]
    pub nutriments: HashMap<String, Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl RawProduct {
    /// Barcode as text, if present and non-empty
    pub fn identifier(&self) -> Option<String> {
        value_to_string(self.code.as_ref()?).filter(|code| !code.is_empty())
    }

    fn localized(&self, field: &str, locale: &str) -> Option<&str> {
        self.extra
            .get(&format!("{field}_{locale}"))
            .and_then(Value::as_str)
    }
}

/// Convert a raw product into a canonical record.
///
/// `fallback_id` is used when the product itself carries no code (the
/// product endpoint reports it next to the product). Returns `None` when no
/// identifier is available.
pub fn normalize_product(raw: &RawProduct, locale: &str, fallback_id: Option<&str>) -> Option<FoodRecord> {
    let identifier = raw
        .identifier()
        .or_else(|| fallback_id.map(ToString::to_string))?;

    let primary = non_blank(raw.product_name.as_deref());
    let localized = non_blank(raw.localized("product_name", locale));

    let source_name = localized
        .or(primary)
        .unwrap_or(UNKNOWN_PRODUCT_NAME)
        .to_string();

    let aliases = dedup_aliases([
        primary,
        localized,
        non_blank(raw.generic_name.as_deref()),
        non_blank(raw.localized("generic_name", locale)),
        non_blank(raw.abbreviated_product_name.as_deref()),
        non_blank(raw.localized("abbreviated_product_name", locale)),
    ]);

    let serving = raw
        .serving_size
        .as_ref()
        .and_then(value_to_string)
        .and_then(|text| parse_serving_size(&text));

    let mut record = FoodRecord::new(identifier, source_name);
    record.localized_name = localized.map(ToString::to_string);
    record.brand = raw
        .brands
        .as_deref()
        .and_then(|brands| non_blank(brands.split(',').next()))
        .map(ToString::to_string);
    if !aliases.is_empty() {
        record.search_aliases = aliases;
    }
    record.nutriments = nutriments(&raw.nutriments);
    record.serving_size = serving.map(|(size, _)| size);
    record.serving_unit = serving.map(|(_, unit)| unit);
    record.nutriscore = grade(raw.nutriscore_grade.as_deref());
    record.ecoscore = grade(raw.ecoscore_grade.as_deref());
    record.nova_group = raw.nova_group.as_ref().and_then(nova_group);
    Some(record)
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Keep the first spelling of every name, comparing case-insensitively.
fn dedup_aliases<'a>(names: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .flatten()
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(ToString::to_string)
        .collect()
}

fn nutriments(raw: &HashMap<String, Value>) -> Nutriments {
    let get = |key: &str| raw.get(key).and_then(number);

    let calories = get("energy-kcal_100g").or_else(|| {
        get("energy_100g").map(|kj| (kj / KJ_PER_KCAL * 10.0).round() / 10.0)
    });
    let sodium = get("sodium_100g").or_else(|| get("salt_100g").map(|salt| salt / SALT_PER_SODIUM));

    Nutriments {
        calories,
        protein: get("proteins_100g"),
        carbs: get("carbohydrates_100g"),
        fat: get("fat_100g"),
        fiber: get("fiber_100g"),
        sugar: get("sugars_100g"),
        sodium,
    }
}

/// Numeric value from a JSON number or numeric string; never NaN.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Letter grade a-e, lowercased; placeholders like "unknown" are dropped.
fn grade(raw: Option<&str>) -> Option<String> {
    let grade = raw?.trim().to_lowercase();
    matches!(grade.as_str(), "a" | "b" | "c" | "d" | "e").then_some(grade)
}

fn nova_group(value: &Value) -> Option<u8> {
    let group = number(value)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let group = group as u8;
    (1..=4).contains(&group).then_some(group)
}
