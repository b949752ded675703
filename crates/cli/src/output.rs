//! Terminal output utilities

use nutritrack_core::food::{FoodRecord, Nutriments, RankedFoodRecord};
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print ranked search results, one line per record
pub fn print_ranked(results: &[RankedFoodRecord]) {
    for (rank, hit) in results.iter().enumerate() {
        let score = format!("{:>3}", hit.relevance_score);
        let score = if hit.relevance_score >= 80 {
            score.green().to_string()
        } else if hit.relevance_score >= 50 {
            score.yellow().to_string()
        } else {
            score.dimmed().to_string()
        };

        println!(
            "{:>3}. {} {}{} {}",
            rank + 1,
            score,
            hit.record.source_name.bold(),
            brand_suffix(&hit.record),
            format!("[{} · {}]", hit.match_type, hit.record.identifier).dimmed()
        );
    }
}

/// Print a single record with its nutrition facts
pub fn print_record(record: &FoodRecord) {
    Status::header(&format!("{}{}", record.source_name, brand_suffix(record)));
    println!("  {:<12} {}", "Barcode:", record.identifier);
    if let Some(serving) = record.serving_label() {
        println!("  {:<12} {}", "Serving:", serving);
    }
    if let Some(grade) = &record.nutriscore {
        println!("  {:<12} {}", "Nutri-Score:", grade.to_uppercase());
    }
    if let Some(group) = record.nova_group {
        println!("  {:<12} {}", "NOVA:", group);
    }
    if let Some(grade) = &record.ecoscore {
        println!("  {:<12} {}", "Eco-Score:", grade.to_uppercase());
    }
    if record.search_aliases.len() > 1 {
        println!("  {:<12} {}", "Also known:", record.search_aliases.join(", "));
    }

    let facts = nutrition_lines(&record.nutriments);
    if facts.is_empty() {
        println!("  {}", "No nutrition data".dimmed());
    } else {
        println!("  {}", "Per 100 g/ml:".dimmed());
        for line in facts {
            println!("    {line}");
        }
    }
}

/// Nutrition facts present on a record, formatted `label value unit`
pub fn nutrition_lines(nutriments: &Nutriments) -> Vec<String> {
    [
        ("Energy", nutriments.calories, "kcal"),
        ("Protein", nutriments.protein, "g"),
        ("Carbs", nutriments.carbs, "g"),
        ("Sugar", nutriments.sugar, "g"),
        ("Fat", nutriments.fat, "g"),
        ("Fiber", nutriments.fiber, "g"),
        ("Sodium", nutriments.sodium, "g"),
    ]
    .into_iter()
    .filter_map(|(label, value, unit)| value.map(|v| format!("{label:<8} {} {unit}", format_amount(v))))
    .collect()
}

/// Format an amount with at most one decimal, dropping a trailing `.0`
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn brand_suffix(record: &FoodRecord) -> String {
    record
        .brand
        .as_deref()
        .map(|brand| format!(" ({brand})"))
        .unwrap_or_default()
}
