//! Sliding window rate limiting for outbound API calls
//!
//! [`RateLimiter`] keeps a log of admission timestamps and admits a caller
//! only while fewer than `max_requests` of them fall inside the closed
//! trailing interval `[now - window, now]`. A timestamp leaves the window
//! only once it is strictly older than `now - window`. Callers over the
//! limit are suspended, not rejected.
//!
//! # Example
//!
//! ```rust,no_run
//! use nutritrack_core::rate_limit::{RateLimitConfig, RateLimiter};
//!
//! # async fn run() -> nutritrack_core::Result<()> {
//! let limiter = RateLimiter::new(RateLimitConfig::per_minute(10))?;
//!
//! limiter.admit().await;
//! // Proceed with API call
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::observe::{default_observer, SharedObserver};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Timer granularity; a full window frees up one tick after its edge
const TICK: Duration = Duration::from_millis(1);

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admissions per window
    pub max_requests: u32,
    /// Length of the trailing window
    #[serde(rename = "window_ms", with = "duration_ms")]
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(10)
    }
}

impl RateLimitConfig {
    /// Create a limit of `max_requests` per `window`
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Per-second rate limit
    #[must_use]
    pub fn per_second(max: u32) -> Self {
        Self::new(max, Duration::from_secs(1))
    }

    /// Per-minute rate limit
    #[must_use]
    pub fn per_minute(max: u32) -> Self {
        Self::new(max, Duration::from_secs(60))
    }

    /// Reject limits that could never admit anyone
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(Error::invalid_config(
                "rate_limit.max_requests",
                "must be greater than zero",
            )
            .with_suggestion("A limit of zero would block every request forever"));
        }
        if self.window.is_zero() {
            return Err(Error::invalid_config(
                "rate_limit.window_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Rate limit status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    /// Admissions still available in the current window
    pub available: u32,
    /// Maximum admissions per window
    pub max: u32,
    /// Time until the oldest admission leaves the window
    pub reset_in: Duration,
}

/// Sliding window log limiter shared by every caller of the external API.
///
/// The timestamp log is only touched while holding the mutex, and the lock is
/// never held across an await point.
pub struct RateLimiter {
    log: Mutex<VecDeque<Instant>>,
    config: RateLimitConfig,
    observer: SharedObserver,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("recorded", &self.lock().len())
            .finish()
    }
}

impl RateLimiter {
    /// Create a new rate limiter, rejecting unusable limits
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            log: Mutex::new(VecDeque::with_capacity(config.max_requests as usize)),
            config,
            observer: default_observer(),
        })
    }

    /// Replace the observer notified about admission delays
    #[must_use]
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until the window has room, then record the admission.
    ///
    /// If this future is dropped while waiting nothing is recorded. Once it
    /// returns, the admission stays in the log even if the request it guarded
    /// is later cancelled.
    pub async fn admit(&self) {
        loop {
            let wait = match self.try_reserve(Instant::now()) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            self.observer.admission_delayed(wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Record an admission if the window has room, without waiting
    #[must_use]
    pub fn try_admit(&self) -> bool {
        self.try_reserve(Instant::now()).is_ok()
    }

    /// Admissions available right now
    #[must_use]
    pub fn remaining_capacity(&self) -> u32 {
        let mut log = self.lock();
        self.prune(&mut log, Instant::now());
        self.config.max_requests.saturating_sub(len_u32(&log))
    }

    /// Whether `admit` would return without waiting
    #[must_use]
    pub fn is_admittable_now(&self) -> bool {
        self.remaining_capacity() > 0
    }

    /// Current status of the window
    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        let now = Instant::now();
        let mut log = self.lock();
        self.prune(&mut log, now);

        RateLimitStatus {
            available: self.config.max_requests.saturating_sub(len_u32(&log)),
            max: self.config.max_requests,
            reset_in: log
                .front()
                .map_or(Duration::ZERO, |&oldest| {
                    (oldest + self.config.window + TICK).saturating_duration_since(now)
                }),
        }
    }

    /// Forget every recorded admission
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Prune, then either record `now` or report how long to wait.
    fn try_reserve(&self, now: Instant) -> std::result::Result<(), Duration> {
        let mut log = self.lock();
        self.prune(&mut log, now);

        if log.len() < self.config.max_requests as usize {
            log.push_back(now);
            return Ok(());
        }

        let wait = log.front().map_or(TICK, |&oldest| {
            (oldest + self.config.window + TICK).saturating_duration_since(now)
        });
        Err(wait.max(TICK))
    }

    /// Drop every timestamp strictly older than `now - window`.
    fn prune(&self, log: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = log.front() {
            if oldest + self.config.window < now {
                log.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        // A panic while holding the lock cannot leave the log half-updated
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn len_u32(log: &VecDeque<Instant>) -> u32 {
    u32::try_from(log.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::Observer;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn limiter(max: u32, window_ms: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig::new(max, Duration::from_millis(window_ms))).unwrap()
    }

    #[test]
    fn test_rejects_zero_max_requests() {
        let err = RateLimiter::new(RateLimitConfig::new(0, Duration::from_secs(1))).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ConfigValidationError);
    }

    #[test]
    fn test_rejects_zero_window() {
        assert!(RateLimiter::new(RateLimitConfig::new(5, Duration::ZERO)).is_err());
    }

    #[test]
    fn test_try_admit_until_full() {
        let limiter = limiter(3, 1_000);

        assert!(limiter.try_admit());
        assert!(limiter.try_admit());
        assert!(limiter.try_admit());
        assert!(!limiter.try_admit());
        assert_eq!(limiter.remaining_capacity(), 0);
        assert!(!limiter.is_admittable_now());
    }

    #[test]
    fn test_reset() {
        let limiter = limiter(1, 1_000);

        assert!(limiter.try_admit());
        assert!(!limiter.try_admit());

        limiter.reset();
        assert!(limiter.try_admit());
    }

    #[test]
    fn test_status() {
        let limiter = limiter(10, 60_000);
        assert_eq!(
            limiter.status(),
            RateLimitStatus {
                available: 10,
                max: 10,
                reset_in: Duration::ZERO,
            }
        );

        assert!(limiter.try_admit());
        let status = limiter.status();
        assert_eq!(status.available, 9);
        assert!(status.reset_in > Duration::ZERO);
        assert!(status.reset_in <= Duration::from_secs(60) + TICK);
    }

    #[test]
    fn test_wait_is_time_until_oldest_expires() {
        let limiter = limiter(2, 1_000);
        let start = Instant::now();

        assert!(limiter.try_reserve(start).is_ok());
        assert!(limiter.try_reserve(start + Duration::from_millis(400)).is_ok());

        let wait = limiter
            .try_reserve(start + Duration::from_millis(600))
            .unwrap_err();
        assert_eq!(wait, Duration::from_millis(401));

        // Oldest aged out: the window slides instead of resetting
        assert!(limiter.try_reserve(start + Duration::from_millis(1_001)).is_ok());
        assert!(limiter.try_reserve(start + Duration::from_millis(1_100)).is_err());
    }

    #[test]
    fn test_window_edge_is_inclusive() {
        let limiter = limiter(1, 1_000);
        let start = Instant::now();

        assert!(limiter.try_reserve(start).is_ok());
        let wait = limiter
            .try_reserve(start + Duration::from_millis(1_000))
            .unwrap_err();
        assert_eq!(wait, TICK);
        assert!(limiter.try_reserve(start + Duration::from_millis(1_001)).is_ok());
    }

    #[test]
    fn test_config_serde_uses_milliseconds() {
        let config: RateLimitConfig =
            toml::from_str("max_requests = 10\nwindow_ms = 60000\n").unwrap();
        assert_eq!(config, RateLimitConfig::per_minute(10));

        let rendered = toml::to_string(&RateLimitConfig::per_second(5)).unwrap();
        assert!(rendered.contains("window_ms = 1000"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_blocks_until_window_slides() {
        let limiter = limiter(2, 1_000);
        let start = Instant::now();

        limiter.admit().await;
        limiter.admit().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.admit().await;
        assert!(start.elapsed() > Duration::from_millis(1_000));
    }

    #[derive(Default)]
    struct CountingObserver {
        delays: std::sync::Mutex<Vec<Duration>>,
    }

    impl Observer for CountingObserver {
        fn admission_delayed(&self, wait: Duration) {
            self.delays.lock().unwrap().push(wait);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_reports_delay() {
        let observer = Arc::new(CountingObserver::default());
        let limiter = limiter(1, 500).with_observer(observer.clone());

        limiter.admit().await;
        limiter.admit().await;

        let delays = observer.delays.lock().unwrap();
        assert_eq!(delays.len(), 1);
        assert_eq!(delays[0], Duration::from_millis(501));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_respect_window() {
        let limiter = Arc::new(limiter(3, 1_000));
        let admitted = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            let admitted = Arc::clone(&admitted);
            handles.push(tokio::spawn(async move {
                limiter.admit().await;
                admitted.lock().unwrap().push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut times = admitted.lock().unwrap().clone();
        times.sort();
        assert_eq!(times.len(), 10);
        for pair in times.windows(4) {
            assert!(pair[3].duration_since(pair[0]) > Duration::from_millis(1_000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_records_nothing() {
        let limiter = limiter(1, 1_000);
        limiter.admit().await;

        let waiting = tokio::time::timeout(Duration::from_millis(100), limiter.admit()).await;
        assert!(waiting.is_err());
        assert_eq!(limiter.lock().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_never_more_than_max_in_any_window(
            max in 1u32..6,
            window_ms in 1u64..500,
            gaps in proptest::collection::vec(0u64..200, 1..60),
        ) {
            let limiter = limiter(max, window_ms);
            let window = Duration::from_millis(window_ms);
            let mut now = Instant::now();
            let mut admitted = Vec::new();

            for gap in gaps {
                now += Duration::from_millis(gap);
                match limiter.try_reserve(now) {
                    Ok(()) => admitted.push(now),
                    Err(wait) => prop_assert!(wait > Duration::ZERO && wait <= window + TICK),
                }
            }

            let max = max as usize;
            for (i, &t) in admitted.iter().enumerate() {
                if let Some(&later) = admitted.get(i + max) {
                    prop_assert!(later.duration_since(t) > window);
                }
            }
        }
    }
}
