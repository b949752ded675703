//! Search pipeline: rate-limited fetch, usage attachment and ranking
//!
//! ```rust,no_run
//! use nutritrack_core::config::Config;
//! use nutritrack_pipeline::SearchPipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = SearchPipeline::from_config(&Config::load(None)?)?;
//!     for hit in pipeline.search("apfel").await? {
//!         println!("{:>3} {}", hit.relevance_score, hit.record.source_name);
//!     }
//!     Ok(())
//! }
//! ```

mod pipeline;
mod usage;

pub use pipeline::SearchPipeline;
pub use usage::{NoUsage, StaticUsage, UsageProvider};
