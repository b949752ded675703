//! Candidate ranking: score every record, filter, and order.

use crate::normalize::{normalize, NormalizedQuery};
use crate::relevance::{score_field, FieldKind, FieldMatch};
use nutritrack_core::config::RankingConfig;
use nutritrack_core::food::{FoodRecord, MatchType, RankedFoodRecord};
use nutritrack_core::observe::{default_observer, RankingStats, SharedObserver};
use std::cmp::Ordering;
use tracing::warn;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Cap on the usage-dependent part of the popularity boost
const MAX_USAGE_BOOST: u32 = 20;
const USAGE_BOOST_PER_PICK: u32 = 2;
const MAX_SCORE: u32 = 100;

/// Scores, filters and orders candidate records against a query.
///
/// Ranking is a pure function of `(candidates, query, config)`; the ranker
/// holds no mutable state and can be shared freely across threads.
#[derive(Clone)]
pub struct RelevanceRanker {
    config: RankingConfig,
    observer: SharedObserver,
}

impl Default for RelevanceRanker {
    fn default() -> Self {
        Self::new(RankingConfig::default())
    }
}

impl std::fmt::Debug for RelevanceRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceRanker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RelevanceRanker {
    /// Create a ranker with the given configuration
    pub fn new(config: RankingConfig) -> Self {
        Self {
            config,
            observer: default_observer(),
        }
    }

    /// Replace the observer notified after each ranking pass
    #[must_use]
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Rank candidates against a query.
    ///
    /// Candidates scoring below `min_relevance_score` are dropped. The rest
    /// are ordered by descending score, then descending usage count, keeping
    /// input order for full ties, and truncated to `max_results`.
    pub fn rank(&self, candidates: &[FoodRecord], query: &str) -> Vec<RankedFoodRecord> {
        let query_norm = NormalizedQuery::new(query);
        if query_norm.is_blank() {
            warn!("Ignoring blank ranking query");
            return Vec::new();
        }

        let scored = self.score_all(candidates, &query_norm);
        let best_score = scored.iter().map(|r| r.relevance_score).max();

        let mut ranked: Vec<RankedFoodRecord> = scored
            .into_iter()
            .filter(|r| r.relevance_score >= self.config.min_relevance_score)
            .collect();
        let above_threshold = ranked.len();

        ranked.sort_by(compare_ranked);
        ranked.truncate(self.config.max_results);

        self.observer.ranking_finished(
            query_norm.text(),
            &RankingStats {
                candidates: candidates.len(),
                above_threshold,
                returned: ranked.len(),
                best_score,
            },
        );

        ranked
    }

    #[cfg(feature = "parallel")]
    fn score_all(&self, candidates: &[FoodRecord], query: &NormalizedQuery) -> Vec<RankedFoodRecord> {
        candidates
            .par_iter()
            .filter_map(|record| self.score(record, query))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all(&self, candidates: &[FoodRecord], query: &NormalizedQuery) -> Vec<RankedFoodRecord> {
        candidates
            .iter()
            .filter_map(|record| self.score(record, query))
            .collect()
    }

    /// Score a single record.
    ///
    /// Returns `None` when no field matches the query at all; such records
    /// are never ranked, whatever their usage count.
    pub fn score(&self, record: &FoodRecord, query: &NormalizedQuery) -> Option<RankedFoodRecord> {
        let (kind, best) = self.best_field(record, query)?;

        let mut score = best.score;
        if kind == FieldKind::Localized {
            score += u32::from(self.config.localized_bonus);
        }
        score += self.popularity_boost(record.usage());

        let match_type = if kind == FieldKind::Brand {
            MatchType::BrandMatch
        } else {
            best.rule.match_type()
        };

        Some(RankedFoodRecord {
            record: record.clone(),
            relevance_score: u8::try_from(score.min(MAX_SCORE)).unwrap_or(u8::MAX),
            match_type,
            match_position: best.position,
        })
    }

    /// Best-scoring field; on equal scores the earlier field wins, so the
    /// localized name takes precedence over the primary name.
    fn best_field(&self, record: &FoodRecord, query: &NormalizedQuery) -> Option<(FieldKind, FieldMatch)> {
        let fields = [
            (FieldKind::Localized, record.localized_name.as_deref()),
            (FieldKind::Primary, Some(record.source_name.as_str())),
            (FieldKind::Brand, record.brand.as_deref()),
        ];

        let mut best: Option<(FieldKind, FieldMatch)> = None;
        for (kind, text) in fields {
            let Some(text) = text else { continue };
            let field = normalize(text);
            let Some(found) = score_field(&field, query, kind, self.config.fuzzy_matching) else {
                continue;
            };
            if best.is_none_or(|(_, current)| found.score > current.score) {
                best = Some((kind, found));
            }
        }
        best
    }

    fn popularity_boost(&self, usage: u32) -> u32 {
        if usage == 0 {
            return 0;
        }
        u32::from(self.config.cached_item_boost)
            + usage.saturating_mul(USAGE_BOOST_PER_PICK).min(MAX_USAGE_BOOST)
    }
}

fn compare_ranked(a: &RankedFoodRecord, b: &RankedFoodRecord) -> Ordering {
    b.relevance_score
        .cmp(&a.relevance_score)
        .then_with(|| b.record.usage().cmp(&a.record.usage()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutritrack_core::observe::Observer;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn names(results: &[RankedFoodRecord]) -> Vec<&str> {
        results.iter().map(|r| r.record.source_name.as_str()).collect()
    }

    fn record(id: &str, name: &str) -> FoodRecord {
        FoodRecord::new(id, name)
    }

    #[test]
    fn test_exact_match_supremacy() {
        let candidates = vec![
            record("3", "Bio Apfel"),
            record("2", "Apfelsaft"),
            record("1", "Apfel"),
        ];

        let results = RelevanceRanker::default().rank(&candidates, "apfel");

        assert_eq!(names(&results), ["Apfel", "Apfelsaft", "Bio Apfel"]);
        assert_eq!(results[0].relevance_score, 100);
        assert_eq!(results[0].match_type, MatchType::Exact);
        assert_eq!(results[1].relevance_score, 80);
        assert_eq!(results[1].match_type, MatchType::StartsWith);
        assert_eq!(results[2].relevance_score, 65);
        assert_eq!(results[2].match_type, MatchType::WordMatch);
        assert_eq!(results[2].match_position, Some(4));
    }

    #[test]
    fn test_threshold_filtering() {
        let candidates = vec![
            record("1", "Apfel"),
            // fuzzy only, at most 25
            record("2", "Apfl"),
        ];
        let ranker = RelevanceRanker::new(RankingConfig {
            max_results: 100,
            ..RankingConfig::default()
        });

        let results = ranker.rank(&candidates, "apfel");
        assert_eq!(names(&results), ["Apfel"]);
    }

    #[test]
    fn test_popularity_tie_break() {
        let candidates = vec![
            record("1", "Apfel").with_usage_count(0),
            record("2", "Apfel").with_usage_count(5),
        ];

        let results = RelevanceRanker::default().rank(&candidates, "apfel");
        assert_eq!(results[0].record.identifier, "2");
        assert_eq!(results[0].relevance_score, 100);
        assert_eq!(results[1].relevance_score, 100);
    }

    #[test]
    fn test_popularity_boost() {
        let candidates = vec![
            record("1", "Bio Apfel").with_usage_count(3),
            record("2", "Apfelsaft"),
        ];

        let results = RelevanceRanker::default().rank(&candidates, "apfel");
        // 65 + 10 + min(3 * 2, 20)
        assert_eq!(results[0].record.identifier, "1");
        assert_eq!(results[0].relevance_score, 81);
    }

    #[test]
    fn test_popularity_boost_capped() {
        let candidates = vec![record("1", "Bratapfel").with_usage_count(50)];

        let results = RelevanceRanker::default().rank(&candidates, "apfel");
        // 50 + 10 + 20
        assert_eq!(results[0].relevance_score, 80);
    }

    #[test]
    fn test_popular_but_unmatched_is_dropped() {
        let candidates = vec![record("1", "Brot").with_usage_count(100)];
        assert!(RelevanceRanker::default().rank(&candidates, "käse").is_empty());
    }

    #[test]
    fn test_localized_bonus() {
        let candidates = vec![
            record("1", "Bio Apfel"),
            record("2", "Organic apple").with_localized_name("Bio Apfel"),
        ];

        let results = RelevanceRanker::default().rank(&candidates, "apfel");
        assert_eq!(results[0].record.identifier, "2");
        assert_eq!(results[0].relevance_score, 70);
        assert_eq!(results[1].relevance_score, 65);
    }

    #[test]
    fn test_brand_field_reports_brand_match() {
        let candidates = vec![record("1", "Alpenmilch Schokolade").with_brand("Milka")];

        let results = RelevanceRanker::default().rank(&candidates, "milka");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 70);
        assert_eq!(results[0].match_type, MatchType::BrandMatch);
    }

    #[test]
    fn test_name_beats_brand() {
        let candidates = vec![
            record("1", "Nuss Nougat Creme").with_brand("Nutella"),
            record("2", "Nutella"),
        ];

        let results = RelevanceRanker::default().rank(&candidates, "nutella");
        assert_eq!(results[0].record.identifier, "2");
        assert_eq!(results[0].match_type, MatchType::Exact);
        assert_eq!(results[1].match_type, MatchType::BrandMatch);
    }

    #[test]
    fn test_case_insensitive() {
        let candidates = vec![record("1", "APFEL")];
        let results = RelevanceRanker::default().rank(&candidates, "  aPfEl ");
        assert_eq!(results[0].relevance_score, 100);
    }

    #[test]
    fn test_max_results() {
        let candidates: Vec<_> = (0..10).map(|i| record(&i.to_string(), "Apfel")).collect();
        let ranker = RelevanceRanker::new(RankingConfig {
            max_results: 3,
            ..RankingConfig::default()
        });

        let results = ranker.rank(&candidates, "apfel");
        assert_eq!(results.len(), 3);
        // Full ties keep input order
        assert_eq!(results[0].record.identifier, "0");
        assert_eq!(results[2].record.identifier, "2");
    }

    #[test]
    fn test_empty_inputs() {
        let ranker = RelevanceRanker::default();
        assert!(ranker.rank(&[], "apfel").is_empty());
        assert!(ranker.rank(&[record("1", "Apfel")], "   ").is_empty());
    }

    #[test]
    fn test_short_query_evaluates_normally() {
        let results = RelevanceRanker::default().rank(&[record("1", "Ei")], "e");
        assert_eq!(results[0].match_type, MatchType::StartsWith);
    }

    #[test]
    fn test_fuzzy_with_low_threshold() {
        let ranker = RelevanceRanker::new(RankingConfig {
            min_relevance_score: 0,
            ..RankingConfig::default()
        });
        let results = ranker.rank(&[record("1", "Jogurt")], "joghurt");
        assert_eq!(results[0].match_type, MatchType::Fuzzy);
        assert_eq!(results[0].relevance_score, 21);

        let strict = RelevanceRanker::new(RankingConfig {
            min_relevance_score: 0,
            fuzzy_matching: false,
            ..RankingConfig::default()
        });
        assert!(strict.rank(&[record("1", "Jogurt")], "joghurt").is_empty());
    }

    #[derive(Default)]
    struct StatsObserver {
        stats: Mutex<Vec<RankingStats>>,
    }

    impl Observer for StatsObserver {
        fn ranking_finished(&self, _query: &str, stats: &RankingStats) {
            self.stats.lock().unwrap().push(*stats);
        }
    }

    #[test]
    fn test_reports_stats() {
        let observer = Arc::new(StatsObserver::default());
        let ranker = RelevanceRanker::default().with_observer(observer.clone());

        ranker.rank(&[record("1", "Apfel"), record("2", "Brot")], "apfel");

        let stats = observer.stats.lock().unwrap();
        assert_eq!(
            stats[0],
            RankingStats {
                candidates: 2,
                above_threshold: 1,
                returned: 1,
                best_score: Some(100),
            }
        );
    }

    fn arb_record() -> impl Strategy<Value = FoodRecord> {
        (
            "[0-9]{8}",
            "[a-zA-Z ]{0,20}",
            proptest::option::of("[a-zA-Z ]{1,12}"),
            proptest::option::of("[a-zA-Z]{1,8}"),
            proptest::option::of(0u32..40),
        )
            .prop_map(|(id, name, localized, brand, usage)| {
                let mut record = FoodRecord::new(id, name);
                record.localized_name = localized;
                record.brand = brand;
                record.usage_count = usage;
                record
            })
    }

    proptest! {
        #[test]
        fn prop_ranking_is_deterministic(
            candidates in proptest::collection::vec(arb_record(), 0..30),
            query in "[a-zA-Z ]{1,10}",
        ) {
            let ranker = RelevanceRanker::default();
            let first = ranker.rank(&candidates, &query);
            let second = ranker.rank(&candidates, &query);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_scores_bounded_sorted_and_above_threshold(
            candidates in proptest::collection::vec(arb_record(), 0..30),
            query in "[a-z]{1,6}",
            min_score in 0u8..=100,
        ) {
            let ranker = RelevanceRanker::new(RankingConfig {
                min_relevance_score: min_score,
                max_results: 10,
                ..RankingConfig::default()
            });
            let results = ranker.rank(&candidates, &query);

            prop_assert!(results.len() <= 10);
            for r in &results {
                prop_assert!(r.relevance_score <= 100);
                prop_assert!(r.relevance_score >= min_score);
            }
            for pair in results.windows(2) {
                prop_assert!(compare_ranked(&pair[0], &pair[1]) != Ordering::Greater);
            }
        }
    }
}
