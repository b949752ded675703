//! Observer that records pipeline activity as metrics

use crate::registry::{self, MetricsRegistry};
use nutritrack_core::observe::{Observer, RankingStats, RequestOutcome, TracingObserver};
use std::time::Duration;

/// Records limiter, client and ranker activity as metrics and still logs it
///
/// Values go to a [`MetricsRegistry`] (the global one by default) and to the
/// `metrics` facade, so any installed recorder sees them too.
#[derive(Debug, Clone, Copy)]
pub struct MetricsObserver {
    registry: &'static MetricsRegistry,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsObserver {
    /// Observer writing into the global registry
    pub fn new() -> Self {
        Self { registry: registry::metrics() }
    }

    /// Observer writing into a caller-owned registry
    pub fn with_registry(registry: &'static MetricsRegistry) -> Self {
        Self { registry }
    }
}

impl Observer for MetricsObserver {
    fn admission_delayed(&self, wait: Duration) {
        TracingObserver.admission_delayed(wait);
        let wait_ms = wait.as_secs_f64() * 1000.0;
        self.registry.increment("rate_limit.delayed");
        self.registry.histogram("rate_limit.wait_ms", wait_ms);
        metrics::counter!("nutritrack_rate_limit_delayed_total").increment(1);
        metrics::histogram!("nutritrack_rate_limit_wait_ms").record(wait_ms);
    }

    fn request_finished(&self, endpoint: &'static str, elapsed: Duration, outcome: RequestOutcome) {
        TracingObserver.request_finished(endpoint, elapsed, outcome);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.registry
            .increment(&format!("requests.{endpoint}.{}", outcome.as_str()));
        self.registry
            .histogram(&format!("requests.{endpoint}.latency_ms"), elapsed_ms);
        metrics::counter!(
            "nutritrack_requests_total",
            "endpoint" => endpoint,
            "outcome" => outcome.as_str()
        )
        .increment(1);
        metrics::histogram!("nutritrack_request_latency_ms", "endpoint" => endpoint).record(elapsed_ms);
    }

    fn item_skipped(&self, identifier: Option<&str>, reason: &str) {
        TracingObserver.item_skipped(identifier, reason);
        self.registry.increment("search.items_skipped");
        metrics::counter!("nutritrack_items_skipped_total").increment(1);
    }

    #[allow(clippy::cast_precision_loss)]
    fn ranking_finished(&self, query: &str, stats: &RankingStats) {
        TracingObserver.ranking_finished(query, stats);
        self.registry.increment("ranking.queries");
        self.registry
            .histogram("ranking.candidates", stats.candidates as f64);
        self.registry.gauge("ranking.last_returned", stats.returned as u64);
        metrics::counter!("nutritrack_ranking_queries_total").increment(1);
        metrics::histogram!("nutritrack_ranking_candidates").record(stats.candidates as f64);
    }
}
