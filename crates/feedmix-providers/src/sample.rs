use async_trait::async_trait;
use chrono::{Duration, Utc};

use feedmix_common::{ContentClient, ContentItem, ProviderId, Result};

/// In-process provider that fabricates content on demand.
///
/// Every item is stamped with the provider's own identity in its `source`
/// field, which is what the feed tests and the demo mode key on. Items carry
/// a 24 hour expiry from the moment of the fetch.
#[derive(Debug, Clone)]
pub struct SampleContentProvider {
    source: ProviderId,
}

impl SampleContentProvider {
    pub fn new(source: ProviderId) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ContentClient for SampleContentProvider {
    async fn get_content(&self, count: usize) -> Result<Vec<ContentItem>> {
        let expiry = Utc::now() + Duration::hours(24);
        let items = (0..count)
            .map(|n| ContentItem {
                id: format!("{}-{}", self.source, n),
                title: format!("Story {} from provider {}", n, self.source),
                link: format!("https://content.example/{}/{}", self.source, n),
                summary: format!("Sample content served by provider {}", self.source),
                source: self.source.clone(),
                expiry,
            })
            .collect();
        Ok(items)
    }
}
