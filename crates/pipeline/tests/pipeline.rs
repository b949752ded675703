//! End-to-end pipeline behavior against a mock food database

use httpmock::prelude::*;
use nutritrack_core::config::Config;
use nutritrack_core::food::MatchType;
use nutritrack_pipeline::{SearchPipeline, StaticUsage};
use serde_json::json;
use std::sync::Arc;

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.schema.client.base_url = server.base_url();
    config.schema.client.page_size = 25;
    config.schema.rate_limit.max_requests = 20;
    config
}

async fn mock_apfel_search(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/cgi/search.pl")
                .query_param("search_terms", "Apfel")
                .query_param("page_size", "25");
            then.status(200).json_body(json!({
                "products": [
                    {"code": "30000001", "product_name": "Bio Apfel"},
                    {"code": "30000002", "product_name": "Apfelsaft"},
                    {"code": "30000003", "product_name": "Apfel"},
                    {"code": "30000004", "product_name": "Birne"}
                ]
            }));
        })
        .await
}

#[tokio::test]
async fn search_ranks_exact_match_first() {
    let server = MockServer::start_async().await;
    let mock = mock_apfel_search(&server).await;

    let pipeline = SearchPipeline::from_config(&config_for(&server)).unwrap();
    let results = pipeline.search("Apfel").await.unwrap();

    mock.assert_async().await;
    let ranked: Vec<_> = results
        .iter()
        .map(|r| (r.record.identifier.as_str(), r.relevance_score, r.match_type))
        .collect();
    assert_eq!(
        ranked,
        [
            ("30000003", 100, MatchType::Exact),
            ("30000002", 80, MatchType::StartsWith),
            ("30000001", 65, MatchType::WordMatch),
        ]
    );
}

#[tokio::test]
async fn usage_counts_are_attached_and_boost() {
    let server = MockServer::start_async().await;
    mock_apfel_search(&server).await;

    let usage: StaticUsage = [("30000001", 5)].into_iter().collect();
    let pipeline = SearchPipeline::from_config(&config_for(&server))
        .unwrap()
        .with_usage_provider(Arc::new(usage));
    let results = pipeline.search("Apfel").await.unwrap();

    let bio = results
        .iter()
        .find(|r| r.record.identifier == "30000001")
        .unwrap();
    assert_eq!(bio.record.usage_count, Some(5));
    // 65 + boost 10 + min(5 * 2, 20)
    assert_eq!(bio.relevance_score, 85);
    assert_eq!(results[0].record.identifier, "30000003");
    assert_eq!(results[1].record.identifier, "30000001");
}

#[tokio::test]
async fn short_query_skips_network() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({"products": []}));
        })
        .await;

    let pipeline = SearchPipeline::from_config(&config_for(&server)).unwrap();
    assert!(pipeline.search(" a ").await.unwrap().is_empty());
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn lookup_attaches_usage_without_ranking() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/product/30000004.json");
            then.status(200).json_body(json!({
                "status": 1,
                "code": "30000004",
                "product": {"product_name": "Birne"}
            }));
        })
        .await;

    let pipeline = SearchPipeline::from_config(&config_for(&server))
        .unwrap()
        .with_usage_provider(Arc::new(StaticUsage::new().with("30000004", 2)));

    let record = pipeline.lookup("30000004").await.unwrap().unwrap();
    assert_eq!(record.source_name, "Birne");
    assert_eq!(record.usage_count, Some(2));
    assert_eq!(pipeline.client().rate_limiter().remaining_capacity(), 19);
}

#[tokio::test]
async fn clones_share_one_rate_limiter() {
    let server = MockServer::start_async().await;
    mock_apfel_search(&server).await;

    let pipeline = SearchPipeline::from_config(&config_for(&server)).unwrap();
    let clone = pipeline.clone();
    pipeline.search("Apfel").await.unwrap();
    clone.search("Apfel").await.unwrap();

    assert_eq!(pipeline.client().rate_limiter().remaining_capacity(), 18);
}
