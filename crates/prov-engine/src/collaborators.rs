use std::sync::Arc;

use prov_ledger::{InMemoryLedger, Ledger};
use prov_store::{
    ContentStore, InMemoryContentStore, InMemoryRootCache, InMemorySaltStore, RootCache,
    SaltStore,
};

/// Handles to the external systems the engines depend on.
///
/// The engines own nothing else. Pooled connections, clients, and their
/// lifetimes belong to whatever implements these traits.
#[derive(Clone)]
pub struct Collaborators {
    pub content: Arc<dyn ContentStore>,
    pub ledger: Arc<dyn Ledger>,
    pub salts: Arc<dyn SaltStore>,
    /// Read-through accelerator for ledger lookups. Optional.
    pub cache: Option<Arc<dyn RootCache>>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

/// A full set of in-memory collaborators with typed handles kept for
/// inspection and fault injection.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackends {
    pub content: Arc<InMemoryContentStore>,
    pub ledger: Arc<InMemoryLedger>,
    pub salts: Arc<InMemorySaltStore>,
    pub cache: Arc<InMemoryRootCache>,
}

impl InMemoryBackends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trait-object view including the root cache.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            content: self.content.clone(),
            ledger: self.ledger.clone(),
            salts: self.salts.clone(),
            cache: Some(self.cache.clone()),
        }
    }

    /// Trait-object view with no root cache.
    pub fn uncached(&self) -> Collaborators {
        Collaborators {
            cache: None,
            ..self.collaborators()
        }
    }
}
