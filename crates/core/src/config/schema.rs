//! Configuration schema definitions
//!
//! Every section has defaults, so an empty file is a valid configuration.

use crate::error::{Error, Result};
use crate::rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};

/// Public Open Food Facts instance
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Food database connection
    #[serde(default)]
    pub client: ClientSettings,

    /// Outbound request budget
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Relevance scoring
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl ConfigSchema {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;
        self.rate_limit.validate()?;
        self.ranking.validate()?;
        Ok(())
    }
}

/// External food database client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the food database
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Language code used for localized product fields
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Number of candidates fetched per text search
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            locale: default_locale(),
            page_size: default_page_size(),
        }
    }
}

impl ClientSettings {
    /// Validate client settings
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::invalid_config("client.base_url", "cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::invalid_config(
                "client.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::invalid_config("client.user_agent", "cannot be empty")
                .with_suggestion("Open Food Facts asks for an identifying User-Agent, e.g. \"app/1.0 (mail@example.com)\""));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_config("client.timeout_secs", "cannot be zero"));
        }
        if self.locale.trim().is_empty() {
            return Err(Error::invalid_config("client.locale", "cannot be empty"));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_config("client.page_size", "cannot be zero"));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("nutritrack/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_locale() -> String {
    "de".to_string()
}

fn default_page_size() -> u32 {
    50
}

/// Relevance ranking settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Candidates scoring below this are dropped (0-100)
    #[serde(default = "default_min_relevance_score")]
    pub min_relevance_score: u8,

    /// Flat boost for items the user has picked before
    #[serde(default = "default_cached_item_boost")]
    pub cached_item_boost: u8,

    /// Maximum number of ranked results
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Fall back to subsequence matching when nothing else matches
    #[serde(default = "default_true")]
    pub fuzzy_matching: bool,

    /// Bonus when the localized name produced the best match
    #[serde(default = "default_localized_bonus")]
    pub localized_bonus: u8,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_relevance_score: default_min_relevance_score(),
            cached_item_boost: default_cached_item_boost(),
            max_results: default_max_results(),
            fuzzy_matching: true,
            localized_bonus: default_localized_bonus(),
        }
    }
}

impl RankingConfig {
    /// Validate ranking settings
    pub fn validate(&self) -> Result<()> {
        if self.min_relevance_score > 100 {
            return Err(Error::invalid_config(
                "ranking.min_relevance_score",
                "must be between 0 and 100",
            ));
        }
        if self.cached_item_boost > 100 || self.localized_bonus > 100 {
            return Err(Error::invalid_config(
                "ranking",
                "boosts must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

fn default_min_relevance_score() -> u8 {
    30
}

fn default_cached_item_boost() -> u8 {
    10
}

fn default_max_results() -> usize {
    50
}

fn default_localized_bonus() -> u8 {
    5
}

fn default_true() -> bool {
    true
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,

    /// Also write logs to this directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            log_dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
