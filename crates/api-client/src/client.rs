//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{ProductsApi, SearchApi};
use crate::error::{ApiError, ApiResult};
use nutritrack_core::food::FoodRecord;
use nutritrack_core::observe::{default_observer, RequestOutcome, SharedObserver};
use nutritrack_core::rate_limit::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, Span};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Longest error body kept in an [`ApiError::HttpStatus`]
const MAX_ERROR_BODY: usize = 200;

/// Client for the external food database
///
/// This client wraps `reqwest` and adds:
/// - Admission through a shared sliding window rate limiter before every request
/// - A bounded timeout; dropping a call aborts the transfer
/// - Normalization of responses into [`FoodRecord`]s
/// - Request correlation IDs for tracing
///
/// It never retries; retry policy belongs to the caller.
#[derive(Clone)]
pub struct FoodApiClient {
    inner: Client,
    config: Arc<ClientConfig>,
    rate_limiter: Arc<RateLimiter>,
    observer: SharedObserver,
}

impl std::fmt::Debug for FoodApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodApiClient")
            .field("config", &self.config)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

impl FoodApiClient {
    /// Create a new client sharing the given rate limiter
    pub fn new(config: ClientConfig, rate_limiter: Arc<RateLimiter>) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ApiError::config(format!("invalid user_agent: {e}")))?,
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
            rate_limiter,
            observer: default_observer(),
        })
    }

    /// Replace the observer notified about requests and skipped items
    #[must_use]
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the shared rate limiter
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub(crate) fn observer(&self) -> &SharedObserver {
        &self.observer
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access barcode lookup endpoints
    #[must_use]
    pub fn products(&self) -> ProductsApi {
        ProductsApi::new(self.clone())
    }

    /// Access text search endpoints
    #[must_use]
    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    /// Look up a single product by barcode.
    ///
    /// Returns `Ok(None)` when the product does not exist.
    pub async fn get_by_identifier(&self, id: &str) -> ApiResult<Option<FoodRecord>> {
        self.products().get(id).await
    }

    /// Search products by free text, returning at most `limit` candidates.
    ///
    /// Queries shorter than two characters return no results without a
    /// network call.
    pub async fn search_by_text(&self, query: &str, limit: u32) -> ApiResult<Vec<FoodRecord>> {
        self.search().text(query, limit).await
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP
    // -------------------------------------------------------------------------

    /// GET a resource that may legitimately not exist; a 404 is `Ok(None)`.
    pub(crate) async fn get_optional_json(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Option<Value>> {
        self.get_json_with(endpoint, url, query, true).await
    }

    /// GET an endpoint that must exist; a 404 is an [`ApiError::HttpStatus`].
    pub(crate) async fn get_json(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Value> {
        self.get_json_with(endpoint, url, query, false)
            .await?
            .ok_or_else(|| ApiError::http_status(404, "Not Found"))
    }

    /// Admit through the rate limiter, then GET `url` and parse JSON.
    ///
    /// Non-success statuses, timeouts and malformed bodies are errors, except
    /// a 404 when `allow_not_found` is set.
    #[instrument(skip(self, query), fields(request_id))]
    async fn get_json_with(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
        allow_not_found: bool,
    ) -> ApiResult<Option<Value>> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        self.rate_limiter.admit().await;

        let start = Instant::now();
        let result = self.execute(&request_id, url, query, allow_not_found).await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(Some(_)) => RequestOutcome::Success,
            Ok(None) => RequestOutcome::NotFound,
            Err(_) => RequestOutcome::Failed,
        };
        self.observer.request_finished(endpoint, elapsed, outcome);
        debug!(
            request_id = %request_id,
            elapsed_ms = elapsed.as_millis(),
            outcome = outcome.as_str(),
            "Request finished"
        );

        result
    }

    async fn execute(
        &self,
        request_id: &str,
        url: &str,
        query: &[(&str, String)],
        allow_not_found: bool,
    ) -> ApiResult<Option<Value>> {
        let response = self
            .inner
            .get(url)
            .query(query)
            .header(X_REQUEST_ID, request_id)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if allow_not_found && status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), truncate(&body, MAX_ERROR_BODY)));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(Some(value))
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.config.timeout)
        } else if err.is_decode() {
            ApiError::parse(err.to_string())
        } else {
            ApiError::Request(err)
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutritrack_core::rate_limit::RateLimitConfig;

    fn limiter() -> Arc<RateLimiter> {
        Arc::new(RateLimiter::new(RateLimitConfig::per_second(100)).unwrap())
    }

    #[test]
    fn test_client_creation() {
        let client = FoodApiClient::new(ClientConfig::default(), limiter());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClientConfig::default().with_base_url("not-a-url");
        assert!(matches!(
            FoodApiClient::new(config, limiter()),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let config = ClientConfig::default().with_user_agent("bad\nagent");
        assert!(FoodApiClient::new(config, limiter()).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("äöüäöü", 3), "äöü...");
    }
}
