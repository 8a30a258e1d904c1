use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use prov_types::{ContentRef, RecordId, Salt, FIELD_COUNT};

use crate::error::{StoreError, StoreResult};
use crate::fault::FaultInjector;
use crate::traits::{ContentStore, SaltStore};

const CONTENT_STORE: &str = "content store";
const SALT_STORE: &str = "salt store";

/// In-memory, content-addressed blob store.
///
/// The locator is the lowercase hex BLAKE3 digest of the payload, standing
/// in for an IPFS CID. Writing the same payload twice yields the same
/// locator and stores it once.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<ContentRef, Bytes>>,
    latency: RwLock<Option<Duration>>,
    put_faults: FaultInjector,
    get_faults: FaultInjector,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            latency: RwLock::new(None),
            put_faults: FaultInjector::new(),
            get_faults: FaultInjector::new(),
        }
    }

    /// Failure script for `put`.
    pub fn put_faults(&self) -> &FaultInjector {
        &self.put_faults
    }

    /// Failure script for `get`.
    pub fn get_faults(&self) -> &FaultInjector {
        &self.get_faults
    }

    /// Delay every call by `latency` before answering.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut guard) = self.latency.write() {
            *guard = latency;
        }
    }

    /// Overwrite the bytes behind `content_ref`, as untrusted storage might.
    pub fn corrupt(&self, content_ref: &ContentRef, payload: impl Into<Bytes>) -> StoreResult<()> {
        let mut blobs = self.write_blobs()?;
        blobs.insert(content_ref.clone(), payload.into());
        Ok(())
    }

    /// Drop the payload behind `content_ref`.
    pub fn evict(&self, content_ref: &ContentRef) -> StoreResult<bool> {
        Ok(self.write_blobs()?.remove(content_ref).is_some())
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_blobs(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<ContentRef, Bytes>>> {
        self.blobs
            .write()
            .map_err(|_| StoreError::unavailable(CONTENT_STORE, "lock poisoned"))
    }

    async fn simulate_latency(&self) {
        let latency = self.latency.read().ok().and_then(|guard| *guard);
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, payload: Bytes) -> StoreResult<ContentRef> {
        self.simulate_latency().await;
        if self.put_faults.trip() {
            return Err(StoreError::unavailable(CONTENT_STORE, "injected put failure"));
        }
        let content_ref = ContentRef::new(blake3::hash(&payload).to_hex().to_string());
        let mut blobs = self.write_blobs()?;
        blobs.entry(content_ref.clone()).or_insert(payload);
        tracing::trace!(content_ref = %content_ref, "payload stored");
        Ok(content_ref)
    }

    async fn get(&self, content_ref: &ContentRef) -> StoreResult<Bytes> {
        self.simulate_latency().await;
        if self.get_faults.trip() {
            return Err(StoreError::unavailable(CONTENT_STORE, "injected get failure"));
        }
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::unavailable(CONTENT_STORE, "lock poisoned"))?;
        blobs
            .get(content_ref)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(content_ref.clone()))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

/// In-memory salt table keyed by record id.
pub struct InMemorySaltStore {
    salts: RwLock<HashMap<RecordId, [Salt; FIELD_COUNT]>>,
    put_faults: FaultInjector,
    get_faults: FaultInjector,
}

impl InMemorySaltStore {
    pub fn new() -> Self {
        Self {
            salts: RwLock::new(HashMap::new()),
            put_faults: FaultInjector::new(),
            get_faults: FaultInjector::new(),
        }
    }

    pub fn put_faults(&self) -> &FaultInjector {
        &self.put_faults
    }

    pub fn get_faults(&self) -> &FaultInjector {
        &self.get_faults
    }

    /// Forget a record's salts, simulating data loss.
    pub fn remove(&self, record_id: RecordId) -> StoreResult<bool> {
        let mut salts = self
            .salts
            .write()
            .map_err(|_| StoreError::unavailable(SALT_STORE, "lock poisoned"))?;
        Ok(salts.remove(&record_id).is_some())
    }

    pub fn contains(&self, record_id: RecordId) -> bool {
        self.salts
            .read()
            .map(|s| s.contains_key(&record_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.salts.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySaltStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SaltStore for InMemorySaltStore {
    async fn put_salts(&self, record_id: RecordId, salts: &[Salt; FIELD_COUNT]) -> StoreResult<()> {
        if self.put_faults.trip() {
            return Err(StoreError::unavailable(SALT_STORE, "injected put failure"));
        }
        let mut table = self
            .salts
            .write()
            .map_err(|_| StoreError::unavailable(SALT_STORE, "lock poisoned"))?;
        match table.get(&record_id) {
            Some(existing) if existing == salts => Ok(()),
            Some(_) => Err(StoreError::Conflict(record_id)),
            None => {
                table.insert(record_id, *salts);
                Ok(())
            }
        }
    }

    async fn get_salts(&self, record_id: RecordId) -> StoreResult<Option<[Salt; FIELD_COUNT]>> {
        if self.get_faults.trip() {
            return Err(StoreError::unavailable(SALT_STORE, "injected get failure"));
        }
        let table = self
            .salts
            .read()
            .map_err(|_| StoreError::unavailable(SALT_STORE, "lock poisoned"))?;
        Ok(table.get(&record_id).copied())
    }
}

impl std::fmt::Debug for InMemorySaltStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySaltStore")
            .field("record_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salts(seed: u8) -> [Salt; FIELD_COUNT] {
        [
            Salt::from_bytes([seed; 16]),
            Salt::from_bytes([seed + 1; 16]),
            Salt::from_bytes([seed + 2; 16]),
            Salt::from_bytes([seed + 3; 16]),
        ]
    }

    // -----------------------------------------------------------------------
    // Content store
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_then_get_returns_payload() {
        let store = InMemoryContentStore::new();
        let r = store.put(Bytes::from_static(b"payload")).await.unwrap();
        assert_eq!(store.get(&r).await.unwrap(), Bytes::from_static(b"payload"));
    }

    #[tokio::test]
    async fn content_ref_is_blake3_hex() {
        let store = InMemoryContentStore::new();
        let r = store.put(Bytes::from_static(b"abc")).await.unwrap();
        assert_eq!(r.as_str(), blake3::hash(b"abc").to_hex().as_str());
        assert_eq!(r.as_str().len(), 64);
    }

    #[tokio::test]
    async fn identical_payloads_are_stored_once() {
        let store = InMemoryContentStore::new();
        let a = store.put(Bytes::from_static(b"same")).await.unwrap();
        let b = store.put(Bytes::from_static(b"same")).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_ref_is_not_found() {
        let store = InMemoryContentStore::new();
        let missing = ContentRef::new("nope");
        assert_eq!(
            store.get(&missing).await.unwrap_err(),
            StoreError::NotFound(missing)
        );
    }

    #[tokio::test]
    async fn injected_put_failure_is_transient() {
        let store = InMemoryContentStore::new();
        store.put_faults().fail_next(1);
        let err = store.put(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(err.is_transient());
        assert!(store.put(Bytes::from_static(b"x")).await.is_ok());
        assert_eq!(store.put_faults().calls(), 2);
    }

    #[tokio::test]
    async fn corrupt_replaces_bytes_under_same_ref() {
        let store = InMemoryContentStore::new();
        let r = store.put(Bytes::from_static(b"good")).await.unwrap();
        store.corrupt(&r, Bytes::from_static(b"evil")).unwrap();
        assert_eq!(store.get(&r).await.unwrap(), Bytes::from_static(b"evil"));
    }

    #[tokio::test]
    async fn evict_removes_payload() {
        let store = InMemoryContentStore::new();
        let r = store.put(Bytes::from_static(b"gone")).await.unwrap();
        assert!(store.evict(&r).unwrap());
        assert!(matches!(store.get(&r).await, Err(StoreError::NotFound(_))));
    }

    // -----------------------------------------------------------------------
    // Salt store
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn salts_roundtrip() {
        let store = InMemorySaltStore::new();
        store.put_salts(RecordId(1), &salts(1)).await.unwrap();
        assert_eq!(store.get_salts(RecordId(1)).await.unwrap(), Some(salts(1)));
        assert_eq!(store.get_salts(RecordId(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn rewriting_identical_salts_is_idempotent() {
        let store = InMemorySaltStore::new();
        store.put_salts(RecordId(1), &salts(1)).await.unwrap();
        store.put_salts(RecordId(1), &salts(1)).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn different_salts_for_same_record_conflict() {
        let store = InMemorySaltStore::new();
        store.put_salts(RecordId(1), &salts(1)).await.unwrap();
        assert_eq!(
            store.put_salts(RecordId(1), &salts(9)).await.unwrap_err(),
            StoreError::Conflict(RecordId(1))
        );
        assert_eq!(store.get_salts(RecordId(1)).await.unwrap(), Some(salts(1)));
    }

    #[tokio::test]
    async fn remove_simulates_loss() {
        let store = InMemorySaltStore::new();
        store.put_salts(RecordId(5), &salts(5)).await.unwrap();
        assert!(store.remove(RecordId(5)).unwrap());
        assert!(!store.contains(RecordId(5)));
    }

    #[tokio::test]
    async fn injected_get_failure() {
        let store = InMemorySaltStore::new();
        store.get_faults().fail_always();
        assert!(store.get_salts(RecordId(1)).await.unwrap_err().is_transient());
    }
}
