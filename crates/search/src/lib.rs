//! Relevance ranking for food search results.
//!
//! This crate provides:
//! - Text normalization for queries and product fields
//! - An ordered list of match rules (exact, prefix, word, substring, brand, fuzzy)
//! - `RelevanceRanker`, which scores, filters and orders candidates
//! - Parallel scoring with rayon (default `parallel` feature)

mod fuzzy;
mod normalize;
mod ranker;
mod relevance;

pub use fuzzy::{fuzzy_match, subsequence_match, SubsequenceMatch};
pub use normalize::{normalize, words_with_offsets, NormalizedQuery};
pub use ranker::RelevanceRanker;
pub use relevance::{calculate_relevance, score_field, FieldKind, FieldMatch, MatchRule, MATCH_RULES};

pub use nutritrack_core::config::RankingConfig;
pub use nutritrack_core::food::{FoodRecord, MatchType, RankedFoodRecord};
