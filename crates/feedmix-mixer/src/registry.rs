use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use feedmix_common::{ContentClient, ProviderId};

/// Registry shared between the surrounding system and in-flight requests.
pub type SharedRegistry = Arc<RwLock<ClientRegistry>>;

/// Mapping from provider identity to the client capability serving it.
///
/// Absence of an entry is the "unconfigured / disabled" state: the mixer
/// resolves fetches against a missing entry to a failed slot without issuing
/// a call. The registry is shared as [`SharedRegistry`] and may be rebound
/// between requests (the fault-injection override point the feed tests use);
/// the mixer itself only ever reads it.
#[derive(Default)]
pub struct ClientRegistry {
    clients: HashMap<ProviderId, Arc<dyn ContentClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a client to a provider identity, replacing any previous binding.
    pub fn bind(&mut self, provider: ProviderId, client: Arc<dyn ContentClient>) {
        self.clients.insert(provider, client);
    }

    /// Removes the binding for a provider, leaving it unconfigured.
    ///
    /// # Returns
    /// `true` if a binding existed
    pub fn unbind(&mut self, provider: &ProviderId) -> bool {
        self.clients.remove(provider).is_some()
    }

    /// Looks up the client bound to a provider identity.
    pub fn lookup(&self, provider: &ProviderId) -> Option<Arc<dyn ContentClient>> {
        self.clients.get(provider).cloned()
    }

    /// Number of bound providers.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Identities with a client currently bound.
    pub fn providers(&self) -> Vec<ProviderId> {
        self.clients.keys().cloned().collect()
    }

    /// Wraps the registry for sharing with a mixer.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }
}
