//! Observability hooks injected into the limiter, client and ranker
//!
//! Components report what happened through [`Observer`] instead of deciding
//! how it gets logged or measured. [`TracingObserver`] is the default and
//! emits `tracing` events; the telemetry crate provides an observer that also
//! records metrics.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a single outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Response parsed successfully
    Success,
    /// The service reported the item does not exist
    NotFound,
    /// Timeout, HTTP error or malformed body
    Failed,
}

impl RequestOutcome {
    /// Label used in logs and metric names
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
        }
    }
}

/// Summary of one ranking pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankingStats {
    /// Candidates handed to the ranker
    pub candidates: usize,
    /// Candidates at or above the score threshold
    pub above_threshold: usize,
    /// Results returned after truncation
    pub returned: usize,
    /// Highest score seen, if any candidate was scored
    pub best_score: Option<u8>,
}

/// Receiver for events emitted by the retrieval pipeline.
///
/// All methods default to doing nothing.
pub trait Observer: Send + Sync {
    /// A caller had to wait for rate limiter capacity
    fn admission_delayed(&self, _wait: Duration) {}

    /// An outbound request completed or failed
    fn request_finished(&self, _endpoint: &'static str, _elapsed: Duration, _outcome: RequestOutcome) {}

    /// A product in a batch response could not be parsed and was dropped
    fn item_skipped(&self, _identifier: Option<&str>, _reason: &str) {}

    /// A ranking pass finished
    fn ranking_finished(&self, _query: &str, _stats: &RankingStats) {}
}

/// Observer that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Observer that turns events into `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn admission_delayed(&self, wait: Duration) {
        debug!(wait_ms = wait.as_millis(), "Rate limit window full, waiting");
    }

    fn request_finished(&self, endpoint: &'static str, elapsed: Duration, outcome: RequestOutcome) {
        debug!(
            endpoint,
            elapsed_ms = elapsed.as_millis(),
            outcome = outcome.as_str(),
            "Request finished"
        );
    }

    fn item_skipped(&self, identifier: Option<&str>, reason: &str) {
        warn!(identifier = identifier.unwrap_or("<none>"), reason, "Skipping unparseable product");
    }

    fn ranking_finished(&self, query: &str, stats: &RankingStats) {
        debug!(
            query,
            candidates = stats.candidates,
            above_threshold = stats.above_threshold,
            returned = stats.returned,
            best_score = stats.best_score,
            "Ranking finished"
        );
    }
}

/// Shared observer handle
pub type SharedObserver = Arc<dyn Observer>;

/// The observer used when none is injected
#[must_use]
pub fn default_observer() -> SharedObserver {
    Arc::new(TracingObserver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        waits: Mutex<Vec<Duration>>,
    }

    impl Observer for Recording {
        fn admission_delayed(&self, wait: Duration) {
            self.waits.lock().unwrap().push(wait);
        }
    }

    #[test]
    fn test_default_methods_are_noops() {
        let observer = NoopObserver;
        observer.admission_delayed(Duration::from_millis(5));
        observer.item_skipped(None, "missing code");
        observer.ranking_finished("apfel", &RankingStats::default());
    }

    #[test]
    fn test_custom_observer_receives_events() {
        let recording = Recording::default();
        recording.admission_delayed(Duration::from_millis(12));
        recording.request_finished("search", Duration::ZERO, RequestOutcome::Success);
        assert_eq!(*recording.waits.lock().unwrap(), vec![Duration::from_millis(12)]);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RequestOutcome::Success.as_str(), "success");
        assert_eq!(RequestOutcome::NotFound.as_str(), "not_found");
        assert_eq!(RequestOutcome::Failed.as_str(), "failed");
    }
}
