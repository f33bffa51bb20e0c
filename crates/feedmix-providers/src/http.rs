//! HTTP Content Provider
//!
//! Content client backed by a real upstream provider speaking HTTP. The
//! provider is expected to answer `GET {base_url}/content?count={n}` with a
//! JSON array of content items.

use std::time::Duration;

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::Request;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use feedmix_common::{ContentClient, ContentItem, FeedError, ProviderId, Result};

/// Default bound on a single upstream request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Content client for one upstream HTTP provider.
///
/// Each fetch creates its own HTTP connection, so concurrent fetches against
/// the same provider do not serialize through shared connection state.
pub struct HttpContentProvider {
    provider: ProviderId,
    base_url: String,
    timeout: Duration,
}

impl HttpContentProvider {
    /// Creates a client for `provider` reachable at `base_url`
    /// (e.g., "http://127.0.0.1:9001").
    pub fn new(provider: ProviderId, base_url: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Identity of the provider this client serves.
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }
}

#[async_trait]
impl ContentClient for HttpContentProvider {
    async fn get_content(&self, count: usize) -> Result<Vec<ContentItem>> {
        let url = format!(
            "{}/content?count={}",
            self.base_url.trim_end_matches('/'),
            count
        );

        let request = Request::builder()
            .method("GET")
            .uri(&url)
            .header("Accept", "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| FeedError::Transport(format!("Failed to build request: {}", e)))?;

        let client = Client::builder(TokioExecutor::new()).build_http();

        let response_future = client.request(request);
        let response = tokio::time::timeout(self.timeout, response_future)
            .await
            .map_err(|_| FeedError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(|e| FeedError::Transport(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedError::Provider(format!(
                "provider '{}' responded with status {}",
                self.provider,
                response.status()
            )));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FeedError::Transport(format!("Failed to read response body: {}", e)))?
            .to_bytes();

        let items: Vec<ContentItem> = serde_json::from_slice(&body)?;

        Ok(items)
    }
}
