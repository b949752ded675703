//! Field-level relevance rules.
//!
//! Each candidate field is checked against an ordered list of [`MatchRule`]s;
//! the first rule that matches decides the field's score. Name fields
//! (primary and localized) and the brand field use different weights.

use crate::fuzzy::subsequence_match;
use crate::normalize::{char_offset, words_with_offsets, NormalizedQuery};
use nutritrack_core::food::MatchType;

/// Which part of a record a field came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Name in the configured secondary language
    Localized,
    /// Display name
    Primary,
    /// Brand, scored with lower weights
    Brand,
}

impl FieldKind {
    fn is_brand(self) -> bool {
        self == Self::Brand
    }
}

/// Matching heuristics in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// Field equals the query
    Exact,
    /// Field starts with the query
    StartsWith,
    /// Every query word is a field word or a prefix of one
    WordMatch,
    /// Query occurs anywhere in the field
    Contains,
    /// The query mentions the whole brand (brand field only)
    BrandOnly,
    /// Most query characters occur in order
    Fuzzy,
}

/// Rules in the order they are tried
pub const MATCH_RULES: [MatchRule; 6] = [
    MatchRule::Exact,
    MatchRule::StartsWith,
    MatchRule::WordMatch,
    MatchRule::Contains,
    MatchRule::BrandOnly,
    MatchRule::Fuzzy,
];

/// Name / brand scores for exact matches
const EXACT: (u32, u32) = (100, 70);
/// Name / brand scores for prefix matches
const STARTS_WITH: (u32, u32) = (80, 50);
/// Name / brand base and floor for word matches
const WORD_BASE: (u32, u32) = (70, 40);
const WORD_FLOOR: (u32, u32) = (50, 30);
const WORD_OFFSET_PENALTY: u32 = 5;
/// Name / brand base and floor for substring matches
const CONTAINS_BASE: (u32, u32) = (50, 30);
const CONTAINS_FLOOR: (u32, u32) = (35, 20);
const CONTAINS_CHARS_PER_POINT: usize = 5;
const BRAND_ONLY: u32 = 25;
const FUZZY_MIN_RATIO: f64 = 0.7;
const FUZZY_MAX: f64 = 25.0;

/// Score of one field under one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    /// Score in 0..=100
    pub score: u32,
    /// Rule that produced the score
    pub rule: MatchRule,
    /// Character offset of the match within the field
    pub position: Option<usize>,
}

impl MatchRule {
    /// Whether this rule is evaluated for the given field
    pub fn applies_to(self, field: FieldKind) -> bool {
        match self {
            Self::BrandOnly => field.is_brand(),
            _ => true,
        }
    }

    /// Match type reported when this rule wins on a name field
    pub fn match_type(self) -> MatchType {
        match self {
            Self::Exact => MatchType::Exact,
            Self::StartsWith => MatchType::StartsWith,
            Self::WordMatch => MatchType::WordMatch,
            Self::Contains => MatchType::Contains,
            Self::BrandOnly => MatchType::BrandMatch,
            Self::Fuzzy => MatchType::Fuzzy,
        }
    }

    /// Evaluate this rule against a normalized field.
    ///
    /// Returns `None` when the rule does not match; a fuzzy match below the
    /// ratio threshold also counts as no match.
    pub fn evaluate(self, field: &str, query: &NormalizedQuery, kind: FieldKind) -> Option<FieldMatch> {
        let q = query.text();
        if field.is_empty() || q.is_empty() || !self.applies_to(kind) {
            return None;
        }

        let (score, position) = match self {
            Self::Exact => (field == q).then(|| (pick(EXACT, kind), Some(0)))?,
            Self::StartsWith => field
                .starts_with(q)
                .then(|| (pick(STARTS_WITH, kind), Some(0)))?,
            Self::WordMatch => {
                let (index, offset) = first_word_match(field, query)?;
                let penalty = WORD_OFFSET_PENALTY.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
                let score = pick(WORD_BASE, kind)
                    .saturating_sub(penalty)
                    .max(pick(WORD_FLOOR, kind));
                (score, Some(offset))
            }
            Self::Contains => {
                let offset = char_offset(field, field.find(q)?);
                let penalty = u32::try_from(offset / CONTAINS_CHARS_PER_POINT).unwrap_or(u32::MAX);
                let score = pick(CONTAINS_BASE, kind)
                    .saturating_sub(penalty)
                    .max(pick(CONTAINS_FLOOR, kind));
                (score, Some(offset))
            }
            Self::BrandOnly => {
                // Word-bounded: brand "bio" should not match query "biolade"
                let padded_query = format!(" {q} ");
                let padded_brand = format!(" {field} ");
                padded_query
                    .contains(&padded_brand)
                    .then_some((BRAND_ONLY, None))?
            }
            Self::Fuzzy => {
                let result = subsequence_match(field, q);
                let ratio = result.ratio();
                if ratio < FUZZY_MIN_RATIO {
                    return None;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let score = (ratio * FUZZY_MAX).round() as u32;
                (score, result.first_position)
            }
        };

        Some(FieldMatch {
            score,
            rule: self,
            position,
        })
    }
}

fn pick(weights: (u32, u32), kind: FieldKind) -> u32 {
    if kind.is_brand() {
        weights.1
    } else {
        weights.0
    }
}

/// Every query word must equal or prefix some field word. Returns the word
/// index and character offset of the earliest field word that matched.
fn first_word_match(field: &str, query: &NormalizedQuery) -> Option<(usize, usize)> {
    let field_words = words_with_offsets(field);
    let mut earliest: Option<(usize, usize)> = None;

    for query_word in query.words() {
        let (index, &(offset, _)) = field_words
            .iter()
            .enumerate()
            .find(|(_, (_, word))| word.starts_with(query_word.as_str()))?;
        if earliest.is_none_or(|(best, _)| index < best) {
            earliest = Some((index, offset));
        }
    }

    earliest
}

/// Score one normalized field by trying every applicable rule in order.
///
/// The first matching rule wins. Fuzzy matching is only attempted when
/// `fuzzy` is enabled.
pub fn score_field(field: &str, query: &NormalizedQuery, kind: FieldKind, fuzzy: bool) -> Option<FieldMatch> {
    MATCH_RULES
        .iter()
        .filter(|rule| fuzzy || **rule != MatchRule::Fuzzy)
        .find_map(|rule| rule.evaluate(field, query, kind))
}

/// Score a single text against a query with name-field weights.
///
/// # Returns
/// Relevance score in 0..=100, zero when nothing matches
pub fn calculate_relevance(text: &str, query: &str) -> u32 {
    let field = crate::normalize::normalize(text);
    let query = NormalizedQuery::new(query);
    score_field(&field, &query, FieldKind::Primary, true).map_or(0, |m| m.score)
}
