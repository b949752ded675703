//! Configuration for the food database client

use crate::error::{ApiError, ApiResult};
use nutritrack_core::config::ClientSettings;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the food database, without trailing slash
    pub base_url: String,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Request timeout covering connect, send and body
    pub timeout: Duration,
    /// Language code of localized product fields (`product_name_<locale>`)
    pub locale: String,
    /// Default number of candidates per text search
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&ClientSettings::default())
    }
}

impl From<&ClientSettings> for ClientConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            locale: settings.locale.to_lowercase(),
            page_size: settings.page_size,
        }
    }
}

impl ClientConfig {
    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder-style method to set the User-Agent
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the localized field language
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into().to_lowercase();
        self
    }

    /// Builder-style method to set the search page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ApiError::config("user_agent cannot be empty"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.locale.is_empty() || !self.locale.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ApiError::config("locale must be a language code such as \"de\""));
        }

        Ok(())
    }
}
