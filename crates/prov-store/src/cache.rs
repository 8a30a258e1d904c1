use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use prov_types::{AnchoredRoot, RecordId};

use crate::traits::RootCache;

#[derive(Clone, Debug)]
struct CacheEntry {
    anchored: AnchoredRoot,
    expires_at: Instant,
}

/// In-memory TTL cache of anchored roots.
///
/// Expired entries read as misses and are swept on the next write.
#[derive(Debug, Default)]
pub struct InMemoryRootCache {
    entries: RwLock<HashMap<RecordId, CacheEntry>>,
}

impl InMemoryRootCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a live entry exists for `record_id`.
    pub fn contains(&self, record_id: RecordId) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .map(|e| e.get(&record_id).is_some_and(|entry| entry.expires_at > now))
            .unwrap_or(false)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        match self.entries.write() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, entry| entry.expires_at > now);
                before - entries.len()
            }
            Err(_) => 0,
        }
    }
}

#[async_trait]
impl RootCache for InMemoryRootCache {
    async fn get(&self, record_id: RecordId) -> Option<AnchoredRoot> {
        let now = Instant::now();
        let entries = self.entries.read().ok()?;
        entries
            .get(&record_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.anchored.clone())
    }

    async fn put(&self, record_id: RecordId, anchored: AnchoredRoot, ttl: Duration) {
        let now = Instant::now();
        let Some(expires_at) = now.checked_add(ttl) else {
            tracing::warn!(record_id = %record_id, ?ttl, "cache ttl overflows clock; entry dropped");
            return;
        };
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| entry.expires_at > now);
            entries.insert(record_id, CacheEntry { anchored, expires_at });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prov_types::{ContentRef, Digest};

    fn anchored(seed: u8) -> AnchoredRoot {
        AnchoredRoot::new(Digest::from_hash([seed; 32]), ContentRef::new(format!("ref-{seed}")))
    }

    #[tokio::test]
    async fn miss_on_empty_cache() {
        let cache = InMemoryRootCache::new();
        assert!(cache.get(RecordId(1)).await.is_none());
    }

    #[tokio::test]
    async fn hit_within_ttl() {
        let cache = InMemoryRootCache::new();
        cache.put(RecordId(1), anchored(1), Duration::from_secs(60)).await;
        assert_eq!(cache.get(RecordId(1)).await, Some(anchored(1)));
        assert!(cache.contains(RecordId(1)));
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let cache = InMemoryRootCache::new();
        cache.put(RecordId(1), anchored(1), Duration::ZERO).await;
        assert!(cache.get(RecordId(1)).await.is_none());
        assert!(!cache.contains(RecordId(1)));
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn writes_sweep_expired_entries() {
        let cache = InMemoryRootCache::new();
        cache.put(RecordId(1), anchored(1), Duration::ZERO).await;
        cache.put(RecordId(2), anchored(2), Duration::from_secs(60)).await;
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn huge_ttl_is_dropped_not_panicking() {
        let cache = InMemoryRootCache::new();
        cache.put(RecordId(1), anchored(1), Duration::MAX).await;
        assert!(cache.get(RecordId(1)).await.is_none());
    }
}
