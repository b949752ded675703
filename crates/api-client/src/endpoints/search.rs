//! Free-text search endpoint

use crate::client::FoodApiClient;
use crate::error::ApiResult;
use crate::normalize::{normalize_product, RawProduct};
use nutritrack_core::food::FoodRecord;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const ENDPOINT: &str = "search";

/// Queries shorter than this (after trimming) are not sent upstream
pub const MIN_QUERY_CHARS: usize = 2;

/// Text search interface
#[derive(Clone, Debug)]
pub struct SearchApi {
    client: FoodApiClient,
}

impl SearchApi {
    pub(crate) fn new(client: FoodApiClient) -> Self {
        Self { client }
    }

    /// Search by free text, returning at most `limit` candidates in
    /// upstream order.
    ///
    /// Items that cannot be read or have no barcode are skipped and reported
    /// to the observer; they never fail the whole search. Any non-success
    /// status, including 404, is an [`ApiError::HttpStatus`](crate::ApiError).
    pub async fn text(&self, query: &str, limit: u32) -> ApiResult<Vec<FoodRecord>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS || limit == 0 {
            debug!(query, "Query too short, skipping search");
            return Ok(Vec::new());
        }

        let url = format!("{}/cgi/search.pl", self.client.base_url());
        let params = [
            ("search_terms", query.to_string()),
            ("search_simple", "1".to_string()),
            ("action", "process".to_string()),
            ("page_size", limit.to_string()),
            ("page", "1".to_string()),
            ("json", "1".to_string()),
        ];

        // Unlike product lookup, a 404 here is an error.
        let body = self.client.get_json(ENDPOINT, &url, &params).await?;
        let response: SearchResponse = serde_json::from_value(body)?;
        Ok(self.normalize_items(response.products, limit))
    }

    fn normalize_items(&self, items: Vec<Value>, limit: u32) -> Vec<FoodRecord> {
        let locale = &self.client.config().locale;
        let observer = self.client.observer();

        items
            .into_iter()
            .filter_map(|item| {
                let code = item.get("code").map(|c| match c {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
                match serde_json::from_value::<RawProduct>(item) {
                    Ok(raw) => match normalize_product(&raw, locale, None) {
                        Some(record) => Some(record),
                        None => {
                            observer.item_skipped(None, "missing barcode");
                            None
                        }
                    },
                    Err(e) => {
                        warn!(code = ?code, error = %e, "Skipping unreadable search item");
                        observer.item_skipped(code.as_deref(), &e.to_string());
                        None
                    }
                }
            })
            .take(limit as usize)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Value>,
}
