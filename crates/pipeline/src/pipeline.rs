use crate::usage::{NoUsage, UsageProvider};
use nutritrack_api_client::{ApiError, ApiResult, ClientConfig, FoodApiClient};
use nutritrack_core::config::Config;
use nutritrack_core::food::{FoodRecord, RankedFoodRecord};
use nutritrack_core::observe::{default_observer, SharedObserver};
use nutritrack_core::rate_limit::RateLimiter;
use nutritrack_search::RelevanceRanker;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Composition root: limiter → client → usage → ranker
///
/// Cloning is cheap; clones share the client's rate limiter.
#[derive(Clone)]
pub struct SearchPipeline {
    client: FoodApiClient,
    ranker: Arc<RelevanceRanker>,
    usage: Arc<dyn UsageProvider>,
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("client", &self.client)
            .field("ranking", self.ranker.config())
            .finish_non_exhaustive()
    }
}

impl SearchPipeline {
    pub fn new(client: FoodApiClient, ranker: RelevanceRanker) -> Self {
        Self {
            client,
            ranker: Arc::new(ranker),
            usage: Arc::new(NoUsage),
        }
    }

    /// Build limiter, client and ranker from configuration, logging through
    /// the default observer.
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::from_config_with_observer(config, default_observer())
    }

    /// Like [`from_config`](Self::from_config), with one observer shared by
    /// every component.
    pub fn from_config_with_observer(config: &Config, observer: SharedObserver) -> ApiResult<Self> {
        let schema = &config.schema;

        let limiter = RateLimiter::new(schema.rate_limit.clone())
            .map_err(|e| ApiError::config(e.to_string()))?
            .with_observer(observer.clone());
        let client = FoodApiClient::new(ClientConfig::from(&schema.client), Arc::new(limiter))?
            .with_observer(observer.clone());
        let ranker = RelevanceRanker::new(schema.ranking.clone()).with_observer(observer);

        Ok(Self::new(client, ranker))
    }

    /// Replace the usage count source
    #[must_use]
    pub fn with_usage_provider(mut self, usage: Arc<dyn UsageProvider>) -> Self {
        self.usage = usage;
        self
    }

    pub fn client(&self) -> &FoodApiClient {
        &self.client
    }

    pub fn ranker(&self) -> &RelevanceRanker {
        &self.ranker
    }

    /// Search by text and return ranked results, best first.
    ///
    /// Short or blank queries return no results without a network call.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> ApiResult<Vec<RankedFoodRecord>> {
        let page_size = self.client.config().page_size;
        let candidates: Vec<FoodRecord> = self
            .client
            .search_by_text(query, page_size)
            .await?
            .into_iter()
            .map(|record| self.attach_usage(record))
            .collect();

        debug!(candidates = candidates.len(), "Ranking candidates");
        Ok(self.ranker.rank(&candidates, query))
    }

    /// Look up one product by barcode; not ranked.
    #[instrument(skip(self))]
    pub async fn lookup(&self, id: &str) -> ApiResult<Option<FoodRecord>> {
        let record = self.client.get_by_identifier(id).await?;
        Ok(record.map(|r| self.attach_usage(r)))
    }

    fn attach_usage(&self, mut record: FoodRecord) -> FoodRecord {
        if let Some(count) = self.usage.usage_count(&record.identifier) {
            record.usage_count = Some(count);
        }
        record
    }
}
