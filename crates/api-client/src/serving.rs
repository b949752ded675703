//! Serving size parsing.
//!
//! Free-text serving sizes such as `"100g"`, `"250 ml"` or
//! `"1 slice (30g)"` are reduced to an amount in grams or milliliters.

use nutritrack_core::food::ServingUnit;
use once_cell::sync::Lazy;
use regex::Regex;

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d+(?:[.,]\d+)?)\s*(kilogramm|kg|mg|ml|cl|dl|gramm|grams|gram|gr|g|liter|litre|l)\b",
    )
    .expect("serving size pattern is valid")
});

/// Parse a serving size string into `(amount, unit)`.
///
/// The first amount with a mass or volume unit wins; kilograms and
/// milligrams become grams, liters, centiliters and deciliters become
/// milliliters. Anything else yields `None`.
pub fn parse_serving_size(text: &str) -> Option<(f64, ServingUnit)> {
    let captures = AMOUNT_RE.captures(text)?;
    let amount: f64 = captures[1].replace(',', ".").parse().ok()?;
    let unit = captures[2].to_lowercase();

    let (factor, unit) = match unit.as_str() {
        "kg" | "kilogramm" => (1000.0, ServingUnit::Grams),
        "mg" => (0.001, ServingUnit::Grams),
        "g" | "gr" | "gram" | "grams" | "gramm" => (1.0, ServingUnit::Grams),
        "l" | "liter" | "litre" => (1000.0, ServingUnit::Milliliters),
        "dl" => (100.0, ServingUnit::Milliliters),
        "cl" => (10.0, ServingUnit::Milliliters),
        "ml" => (1.0, ServingUnit::Milliliters),
        _ => return None,
    };

    let size = round_to_hundredths(amount * factor);
    (size.is_finite() && size > 0.0).then_some((size, unit))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
