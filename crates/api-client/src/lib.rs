//! Rate-limited client for the Open Food Facts product database
//!
//! Every request is admitted through a shared sliding window
//! [`RateLimiter`](nutritrack_core::rate_limit::RateLimiter) and bounded by a
//! timeout. Responses are normalized into
//! [`FoodRecord`](nutritrack_core::food::FoodRecord)s.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nutritrack_api_client::{ClientConfig, FoodApiClient};
//! use nutritrack_core::rate_limit::{RateLimitConfig, RateLimiter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default())?);
//!     let client = FoodApiClient::new(ClientConfig::default(), limiter)?;
//!
//!     if let Some(product) = client.get_by_identifier("4000417025005").await? {
//!         println!("{}", product.source_name);
//!     }
//!
//!     let candidates = client.search_by_text("apfel", 20).await?;
//!     println!("{} candidates", candidates.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod normalize;
pub mod serving;

pub use client::FoodApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, RetrievalKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::FoodApiClient;
    pub use crate::config::ClientConfig;
    pub use crate::endpoints::{ProductsApi, SearchApi};
    pub use crate::error::{ApiError, ApiResult, RetrievalKind};
}
