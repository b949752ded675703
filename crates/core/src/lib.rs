//! Core building blocks for nutritrack food-data retrieval
//!
//! This crate provides the pieces shared by the client, ranker and binaries:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Rate limiting**: sliding window admission control for outbound calls
//! - **Food model**: canonical `FoodRecord` and ranked results
//! - **Observability**: the `Observer` interface injected into components
//! - **Configuration**: TOML-based configuration with validation
//!
//! # Example
//!
//! ```rust,no_run
//! use nutritrack_core::{config::Config, rate_limit::RateLimiter};
//!
//! # async fn run() -> nutritrack_core::Result<()> {
//! let config = Config::load(None)?;
//! let limiter = RateLimiter::new(config.schema.rate_limit.clone())?;
//!
//! limiter.admit().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod food;
pub mod observe;
pub mod rate_limit;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, RankingConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::food::{FoodRecord, MatchType, Nutriments, RankedFoodRecord, ServingUnit};
    pub use crate::observe::{Observer, RankingStats, RequestOutcome, SharedObserver};
    pub use crate::rate_limit::{RateLimitConfig, RateLimiter};
}
