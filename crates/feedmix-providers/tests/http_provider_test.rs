//! HTTP Provider Integration Tests
//!
//! Exercises `HttpContentProvider` against an in-process mock upstream.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tokio::net::TcpListener;

use feedmix_common::{ContentClient, ContentItem, FeedError, ProviderId};
use feedmix_providers::HttpContentProvider;

// ============================================================================
// Mock Upstream
// ============================================================================

/// Serves `GET /content?count=n` with `n` well-formed items.
async fn serve_content(Query(params): Query<HashMap<String, String>>) -> Json<Vec<ContentItem>> {
    let count: usize = params
        .get("count")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0);

    let expiry = Utc::now() + chrono::Duration::hours(1);
    let items = (0..count)
        .map(|n| ContentItem {
            id: format!("up-{}", n),
            title: format!("Upstream story {}", n),
            link: format!("https://upstream.example/{}", n),
            summary: "From the mock upstream".to_string(),
            source: ProviderId::new("upstream"),
            expiry,
        })
        .collect();

    Json(items)
}

async fn serve_failure() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn serve_garbage() -> &'static str {
    "this is not json"
}

/// Binds a mock upstream on an ephemeral port and serves it in the
/// background.
async fn start_mock(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

// ============================================================================
// Fetch Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_parses_upstream_items() {
    let addr = start_mock(Router::new().route("/content", get(serve_content))).await;
    let client = HttpContentProvider::new(ProviderId::new("upstream"), format!("http://{}", addr));

    let items = client.get_content(3).await.unwrap();

    assert_eq!(items.len(), 3);
    for item in &items {
        assert_eq!(item.source, ProviderId::new("upstream"));
    }
}

#[tokio::test]
async fn test_fetch_requests_exactly_the_asked_count() {
    let addr = start_mock(Router::new().route("/content", get(serve_content))).await;
    let client = HttpContentProvider::new(ProviderId::new("upstream"), format!("http://{}", addr));

    let items = client.get_content(1).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_non_success_status_is_a_provider_error() {
    let addr = start_mock(Router::new().route("/content", get(serve_failure))).await;
    let client = HttpContentProvider::new(ProviderId::new("upstream"), format!("http://{}", addr));

    let result = client.get_content(1).await;
    assert!(matches!(result, Err(FeedError::Provider(_))));
}

#[tokio::test]
async fn test_malformed_body_is_a_serialization_error() {
    let addr = start_mock(Router::new().route("/content", get(serve_garbage))).await;
    let client = HttpContentProvider::new(ProviderId::new("upstream"), format!("http://{}", addr));

    let result = client.get_content(1).await;
    assert!(matches!(result, Err(FeedError::JsonSerialization(_))));
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_tolerated() {
    let addr = start_mock(Router::new().route("/content", get(serve_content))).await;
    let client =
        HttpContentProvider::new(ProviderId::new("upstream"), format!("http://{}/", addr));

    let items = client.get_content(2).await.unwrap();
    assert_eq!(items.len(), 2);
}
