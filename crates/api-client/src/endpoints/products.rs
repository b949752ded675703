//! Barcode lookup endpoint

use crate::client::FoodApiClient;
use crate::error::{ApiError, ApiResult};
use crate::normalize::{normalize_product, RawProduct};
use nutritrack_core::food::FoodRecord;
use serde::Deserialize;
use tracing::debug;

const ENDPOINT: &str = "product";

/// Barcode lookup interface
#[derive(Clone, Debug)]
pub struct ProductsApi {
    client: FoodApiClient,
}

impl ProductsApi {
    pub(crate) fn new(client: FoodApiClient) -> Self {
        Self { client }
    }

    /// Fetch a product by barcode.
    ///
    /// The identifier is trimmed and must be 8 to 14 ASCII digits; anything
    /// else fails with [`ApiError::InvalidIdentifier`] before any request.
    /// Unknown products yield `Ok(None)`.
    pub async fn get(&self, id: &str) -> ApiResult<Option<FoodRecord>> {
        let id = validate_identifier(id)?;
        let url = format!("{}/api/v2/product/{id}.json", self.client.base_url());

        let Some(body) = self.client.get_optional_json(ENDPOINT, &url, &[]).await? else {
            debug!(barcode = id, "Product not found (404)");
            return Ok(None);
        };

        let response: ProductResponse = serde_json::from_value(body)?;
        if response.status == Some(0) {
            debug!(barcode = id, "Product not found (status 0)");
            return Ok(None);
        }

        let Some(product) = response.product else {
            return Ok(None);
        };

        let fallback = response.code.as_deref().unwrap_or(id);
        Ok(normalize_product(&product, &self.client.config().locale, Some(fallback)))
    }
}

/// Envelope of the product endpoint
#[derive(Debug, Deserialize)]
struct ProductResponse {
    /// 1 when found, 0 when unknown
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    product: Option<RawProduct>,
}

/// Trim and check that an identifier is an 8-14 digit barcode.
pub fn validate_identifier(id: &str) -> ApiResult<&str> {
    let id = id.trim();
    let valid = (8..=14).contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit());
    if valid {
        Ok(id)
    } else {
        Err(ApiError::InvalidIdentifier(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert_eq!(validate_identifier("12345678").unwrap(), "12345678");
        assert_eq!(validate_identifier(" 4000417025005 ").unwrap(), "4000417025005");
        assert!(validate_identifier("12345678901234").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        for id in ["", "abc", "1234567", "123456789012345", "1234-5678", "１２３４５６７８"] {
            assert!(
                matches!(validate_identifier(id), Err(ApiError::InvalidIdentifier(_))),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_response_deserialize() {
        let json = r#"{"status": 0, "code": "12345678", "status_verbose": "product not found"}"#;
        let response: ProductResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, Some(0));
        assert!(response.product.is_none());
    }
}
