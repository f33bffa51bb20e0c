use async_trait::async_trait;

use crate::error::Result;
use crate::types::ContentItem;

/// Capability for fetching content from one upstream provider.
///
/// One client instance is bound per provider identity. A fetch either yields
/// an ordered batch of items or fails; the orchestration core absorbs
/// failures into per-position result slots instead of propagating them to
/// the caller.
///
/// Implementations hold whatever they need to reach their upstream (base
/// URL, credentials, canned data), so the capability itself carries only the
/// requested item count.
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Fetches up to `count` content items from the provider.
    ///
    /// # Returns
    /// - `Ok(items)` - Items in provider order; may be shorter than `count`
    /// - `Err(FeedError)` - The fetch failed as a whole
    async fn get_content(&self, count: usize) -> Result<Vec<ContentItem>>;
}
