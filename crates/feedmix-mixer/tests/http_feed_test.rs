//! Feed Endpoint Integration Tests
//!
//! End-to-end tests over a real bound server: sample providers behind the
//! registry, the default five-slot rotation, and HTTP assertions over the
//! JSON response. The failure scenarios rebind the registry between
//! requests, which is the supported fault-injection override point.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use feedmix_common::{ContentItem, ContentMix, MixEntry, ProviderId};
use feedmix_mixer::{ClientRegistry, HttpServer, Mixer, SharedRegistry};
use feedmix_providers::SampleContentProvider;

// ============================================================================
// Test Helpers
// ============================================================================

fn provider(id: &str) -> ProviderId {
    ProviderId::new(id)
}

/// The default rotation: `1->2, 1->2, 2->3, 3->1, 1` (no fallback on the
/// last slot). A healthy window at offset 0 reads `1,1,2,3,1`.
fn default_mix() -> ContentMix {
    ContentMix::new(vec![
        MixEntry::new(provider("1"), Some(provider("2"))),
        MixEntry::new(provider("1"), Some(provider("2"))),
        MixEntry::new(provider("2"), Some(provider("3"))),
        MixEntry::new(provider("3"), Some(provider("1"))),
        MixEntry::new(provider("1"), None),
    ])
    .unwrap()
}

/// Registry with a healthy sample provider for identities 1, 2 and 3.
fn sample_registry() -> SharedRegistry {
    let mut registry = ClientRegistry::new();
    for id in ["1", "2", "3"] {
        registry.bind(
            provider(id),
            Arc::new(SampleContentProvider::new(provider(id))),
        );
    }
    registry.into_shared()
}

/// Binds an ephemeral port and serves a mixer over it in the background.
async fn start_server(registry: SharedRegistry) -> SocketAddr {
    let mixer = Arc::new(Mixer::new(default_mix(), registry));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind feed server");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        HttpServer::new(mixer).serve(listener).await.unwrap();
    });

    addr
}

async fn fetch_feed(addr: SocketAddr, query: &str) -> BTreeMap<u64, ContentItem> {
    let url = format!("http://{}/{}", addr, query);
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

/// Provider identities of the feed in relative-offset order.
fn sources(feed: &BTreeMap<u64, ContentItem>) -> Vec<String> {
    feed.values().map(|item| item.source.to_string()).collect()
}

// ============================================================================
// Healthy Window Tests
// ============================================================================

#[tokio::test]
async fn test_response_count() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "?offset=0&count=5").await;

    assert_eq!(feed.len(), 5);
}

#[tokio::test]
async fn test_response_order() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "?offset=0&count=5").await;

    assert_eq!(sources(&feed), vec!["1", "1", "2", "3", "1"]);
}

#[tokio::test]
async fn test_offset_response_order() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "?offset=5&count=5").await;

    // Offset 5 starts a new full cycle of the five-slot rotation.
    assert_eq!(sources(&feed), vec!["1", "1", "2", "3", "1"]);
}

#[tokio::test]
async fn test_large_window_follows_the_rotation() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "?offset=10&count=100").await;

    assert_eq!(feed.len(), 100);
    let mix = default_mix();
    for (j, item) in &feed {
        let expected = &mix.entry_at(10 + j).primary;
        assert_eq!(
            &item.source, expected,
            "position {}: got provider {} instead of provider {}",
            j, item.source, expected
        );
    }
}

#[tokio::test]
async fn test_response_keys_are_contiguous_string_offsets() {
    let addr = start_server(sample_registry()).await;

    let url = format!("http://{}/?offset=0&count=3", addr);
    let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();

    let object = body.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["0", "1", "2"]);
    assert!(object["0"]["source"].is_string());
}

// ============================================================================
// Fallback Tests
// ============================================================================

#[tokio::test]
async fn test_fallback_substitutes_a_disabled_provider() {
    let registry = sample_registry();
    let addr = start_server(registry.clone()).await;

    registry.write().await.unbind(&provider("3"));

    let feed = fetch_feed(addr, "?offset=1&count=5").await;

    // Healthy order at offset 1 is 1,2,3,1,1; slot 3 (primary 3) falls back
    // to provider 1.
    assert_eq!(sources(&feed), vec!["1", "2", "1", "1", "1"]);
}

#[tokio::test]
async fn test_fallback_keeps_the_full_count() {
    let registry = sample_registry();
    let addr = start_server(registry.clone()).await;

    registry.write().await.unbind(&provider("3"));

    let feed = fetch_feed(addr, "?offset=1&count=5").await;

    assert_eq!(feed.len(), 5);
}

// ============================================================================
// Truncation Tests
// ============================================================================

#[tokio::test]
async fn test_truncation_when_a_failed_slot_has_no_fallback() {
    let registry = sample_registry();
    let addr = start_server(registry.clone()).await;

    // Provider 1 fails everywhere; the rotation's last slot has no fallback.
    registry.write().await.unbind(&provider("1"));

    let feed = fetch_feed(addr, "?offset=1&count=5").await;

    // 1->2 substitutes the first position, then 2 and 3 serve their own
    // slots, then the fallback-less slot fails and truncates the rest.
    assert_eq!(sources(&feed), vec!["2", "2", "3"]);
}

#[tokio::test]
async fn test_truncation_when_primary_and_fallback_both_fail() {
    let registry = sample_registry();
    let addr = start_server(registry.clone()).await;

    registry.write().await.unbind(&provider("2"));
    registry.write().await.unbind(&provider("3"));

    let feed = fetch_feed(addr, "?offset=0&count=5").await;

    // Healthy order is 1,1,2,3,1; the third slot loses both 2 and its
    // fallback 3, so everything from it on is dropped.
    assert_eq!(sources(&feed), vec!["1", "1"]);
}

#[tokio::test]
async fn test_recovery_after_rebinding_the_registry() {
    let registry = sample_registry();
    let addr = start_server(registry.clone()).await;

    registry.write().await.unbind(&provider("2"));
    registry.write().await.unbind(&provider("3"));
    assert_eq!(fetch_feed(addr, "?offset=0&count=5").await.len(), 2);

    for id in ["2", "3"] {
        registry.write().await.bind(
            provider(id),
            Arc::new(SampleContentProvider::new(provider(id))),
        );
    }
    assert_eq!(fetch_feed(addr, "?offset=0&count=5").await.len(), 5);
}

// ============================================================================
// Parameter Handling Tests
// ============================================================================

#[tokio::test]
async fn test_zero_count_yields_an_empty_object() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "?offset=3&count=0").await;

    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_missing_parameters_yield_an_empty_object() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "").await;

    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_malformed_parameters_are_still_a_200() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "?offset=abc&count=xyz").await;

    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_negative_count_is_treated_as_zero() {
    let addr = start_server(sample_registry()).await;

    let feed = fetch_feed(addr, "?offset=0&count=-5").await;

    assert!(feed.is_empty());
}

// ============================================================================
// Health Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let addr = start_server(sample_registry()).await;

    let url = format!("http://{}/__health", addr);
    let response = reqwest::get(&url).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}
