use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

/// Opaque identity of one upstream content source.
///
/// Used as the key into the client registry and into the mix configuration.
/// The identity is also what the feed response surfaces in each item's
/// `source` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single piece of content returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Identity of the provider that supplied the item.
    pub source: ProviderId,
    pub expiry: DateTime<Utc>,
}

/// One slot of the rotation: a primary provider and an optional fallback.
///
/// The fallback is tried exactly once, and only after the primary fetch for
/// the slot's position has failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixEntry {
    pub primary: ProviderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<ProviderId>,
}

impl MixEntry {
    pub fn new(primary: ProviderId, fallback: Option<ProviderId>) -> Self {
        Self { primary, fallback }
    }
}

/// The fixed, repeating rotation of provider slots.
///
/// An absolute feed position `p` is served by the entry at `p mod len`;
/// the rotation repeats indefinitely. Emptiness is rejected at construction
/// so that [`ContentMix::entry_at`] is total for every position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMix {
    entries: Vec<MixEntry>,
}

impl ContentMix {
    /// Builds a rotation from its ordered entries.
    ///
    /// # Returns
    /// - `Ok(ContentMix)` - Valid, non-empty rotation
    /// - `Err(FeedError::EmptyMix)` - No entries were supplied
    pub fn new(entries: Vec<MixEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(FeedError::EmptyMix);
        }
        Ok(Self { entries })
    }

    /// Resolves the rotation slot serving an absolute feed position.
    pub fn entry_at(&self, position: u64) -> &MixEntry {
        let index = (position % self.entries.len() as u64) as usize;
        &self.entries[index]
    }

    /// Number of slots in one full rotation cycle.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MixEntry] {
        &self.entries
    }
}
