//! Fan-out/Fan-in Mixer
//!
//! The mixer assembles one feed window per request. Every position in the
//! window is resolved to a rotation slot, fetched concurrently from its
//! primary provider, re-fetched from its fallback when the primary fails,
//! and reconciled back into position order with the truncation rule applied.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use feedmix_common::{ContentClient, ContentItem, ContentMix, MixEntry, ProviderId};

use crate::registry::SharedRegistry;

/// Tuning knobs for the mixer.
#[derive(Debug, Clone)]
pub struct MixerConfig {
    /// Upper bound on a single dispatched fetch, primary or fallback.
    ///
    /// A fetch that has not produced a result within this window resolves
    /// its slot to a failure, so an unresponsive provider can delay a phase
    /// by at most this bound instead of stalling it indefinitely.
    /// Default: 30 seconds.
    pub fetch_timeout: Duration,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// One worker's report: which relative offset it served and what it got.
///
/// `None` means the fetch attempt failed or no client was bound; results are
/// keyed by this explicit index, never by arrival order.
struct Slot {
    index: u64,
    item: Option<ContentItem>,
}

/// Fan-out/fan-in orchestrator for the content feed.
///
/// # Request lifecycle
///
/// 1. Every relative offset `j` in the window resolves to the rotation slot
///    serving absolute position `offset + j`.
/// 2. **Primary phase**: one worker task per position fetches a single item
///    from the slot's primary provider. All workers of the phase run
///    concurrently and report into a per-request channel.
/// 3. The phases are separated by a strict barrier: which positions need a
///    fallback is only known once every primary result is in.
/// 4. **Fallback phase**: every failed position with a configured fallback
///    is fetched once more, concurrently; the fallback verdict replaces the
///    slot either way.
/// 5. **Reconciliation**: the window is scanned in relative-offset order and
///    truncated at the first position that still has no item.
///
/// Clients are looked up in the registry at dispatch time, so rebinding the
/// registry between requests is observed by the next request. A provider's
/// failure never aborts the request; it only moves the truncation point.
pub struct Mixer {
    mix: ContentMix,
    clients: SharedRegistry,
    config: MixerConfig,
}

impl Mixer {
    /// Creates a mixer with the default configuration.
    ///
    /// The rotation is validated at construction of [`ContentMix`]; a mixer
    /// therefore always holds a non-empty rotation.
    pub fn new(mix: ContentMix, clients: SharedRegistry) -> Self {
        Self::with_config(mix, clients, MixerConfig::default())
    }

    /// Creates a mixer with a custom configuration.
    pub fn with_config(mix: ContentMix, clients: SharedRegistry, config: MixerConfig) -> Self {
        Self {
            mix,
            clients,
            config,
        }
    }

    /// The rotation served by this mixer.
    pub fn mix_config(&self) -> &ContentMix {
        &self.mix
    }

    /// Assembles the feed window starting at absolute position `offset`,
    /// `count` positions long.
    ///
    /// # Returns
    /// An ordered mapping from relative offset (`0..count`) to the item that
    /// position resolved to. The mapping is always a contiguous, gap-free
    /// prefix of the requested window: positions at and after the first
    /// unrecoverable failure are truncated away. A zero `count` yields an
    /// empty mapping.
    pub async fn mix(&self, offset: u64, count: u64) -> BTreeMap<u64, ContentItem> {
        if count == 0 {
            return BTreeMap::new();
        }

        // Relative offsets index the window; absolute positions index the
        // rotation.
        let entries: Vec<MixEntry> = (0..count)
            .map(|j| self.mix.entry_at(offset + j).clone())
            .collect();

        debug!(
            "mixing window offset={} count={} over a {}-slot rotation",
            offset,
            count,
            self.mix.len()
        );

        let mut slots = self.fetch_primaries(&entries).await;
        self.fetch_fallbacks(&entries, &mut slots).await;

        truncate_at_first_gap(slots)
    }

    /// Primary phase: one concurrent fetch per position in the window.
    ///
    /// Returns once every dispatched worker has reported, with exactly one
    /// slot per position.
    async fn fetch_primaries(&self, entries: &[MixEntry]) -> BTreeMap<u64, Option<ContentItem>> {
        let (tx, mut rx) = mpsc::channel(entries.len());

        for (j, entry) in entries.iter().enumerate() {
            self.dispatch_fetch(j as u64, entry.primary.clone(), tx.clone())
                .await;
        }
        // Dropping our handle lets the receive loop end once every worker
        // has reported.
        drop(tx);

        let mut slots = BTreeMap::new();
        while let Some(slot) = rx.recv().await {
            slots.insert(slot.index, slot.item);
        }
        slots
    }

    /// Fallback phase: re-fetch every failed position that has a fallback
    /// configured.
    ///
    /// Runs only after the primary phase has fully settled. Positions whose
    /// primary succeeded, or that have no fallback, are left untouched; for
    /// the rest the fallback result overwrites the slot, successful or not.
    async fn fetch_fallbacks(
        &self,
        entries: &[MixEntry],
        slots: &mut BTreeMap<u64, Option<ContentItem>>,
    ) {
        let targets: Vec<(u64, ProviderId)> = slots
            .iter()
            .filter(|(_, item)| item.is_none())
            .filter_map(|(j, _)| {
                entries[*j as usize]
                    .fallback
                    .clone()
                    .map(|fallback| (*j, fallback))
            })
            .collect();

        if targets.is_empty() {
            return;
        }

        let (tx, mut rx) = mpsc::channel(targets.len());

        for (j, fallback) in targets {
            self.dispatch_fetch(j, fallback, tx.clone()).await;
        }
        drop(tx);

        while let Some(slot) = rx.recv().await {
            slots.insert(slot.index, slot.item);
        }
    }

    /// Spawns one worker fetching a single item for one position.
    ///
    /// The client is looked up at dispatch time, not pre-captured. The
    /// worker reports exactly one slot on every path - missing client,
    /// fetch error, timeout, or empty batch - so the phase barrier can
    /// count on one message per dispatch.
    async fn dispatch_fetch(&self, index: u64, provider: ProviderId, tx: mpsc::Sender<Slot>) {
        let client = self.clients.read().await.lookup(&provider);
        let timeout = self.config.fetch_timeout;

        tokio::spawn(async move {
            let item = fetch_one(&provider, client, timeout).await;
            // A failed send means the request was dropped and nobody is
            // collecting anymore.
            let _ = tx.send(Slot { index, item }).await;
        });
    }
}

/// Executes a single bounded fetch attempt against an optional client.
async fn fetch_one(
    provider: &ProviderId,
    client: Option<Arc<dyn ContentClient>>,
    timeout: Duration,
) -> Option<ContentItem> {
    let Some(client) = client else {
        debug!("no client bound for provider '{}'", provider);
        return None;
    };

    match tokio::time::timeout(timeout, client.get_content(1)).await {
        Err(_) => {
            warn!(
                "fetch from provider '{}' timed out after {}ms",
                provider,
                timeout.as_millis()
            );
            None
        }
        Ok(Err(e)) => {
            warn!("getting item from provider '{}' failed: {}", provider, e);
            None
        }
        Ok(Ok(items)) => {
            if items.is_empty() {
                warn!("provider '{}' returned an empty batch", provider);
            }
            items.into_iter().next()
        }
    }
}

/// Keeps the contiguous prefix of filled slots and drops everything at and
/// after the first position with no item.
///
/// The scan runs in relative-offset order; any other order would
/// misidentify the truncation point.
fn truncate_at_first_gap(slots: BTreeMap<u64, Option<ContentItem>>) -> BTreeMap<u64, ContentItem> {
    let mut feed = BTreeMap::new();
    for (index, item) in slots {
        match item {
            Some(item) => {
                feed.insert(index, item);
            }
            None => break,
        }
    }
    feed
}
