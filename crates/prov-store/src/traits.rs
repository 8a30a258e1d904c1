use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use prov_types::{AnchoredRoot, ContentRef, RecordId, Salt, FIELD_COUNT};

use crate::error::StoreResult;

/// Content-addressable blob store holding the raw field payloads.
///
/// Implementations must satisfy:
/// - `put` returns only after the payload is durably stored.
/// - `get` returns exactly the bytes stored, or [`StoreError::NotFound`].
///   Callers treat fetched bytes as untrusted regardless.
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put(&self, payload: Bytes) -> StoreResult<ContentRef>;

    async fn get(&self, content_ref: &ContentRef) -> StoreResult<Bytes>;
}

/// Durable mapping from record id to the four per-field salts.
///
/// Losing an entry makes that record permanently unverifiable.
#[async_trait]
pub trait SaltStore: Send + Sync {
    async fn put_salts(&self, record_id: RecordId, salts: &[Salt; FIELD_COUNT]) -> StoreResult<()>;

    /// Returns `Ok(None)` if nothing was recorded for `record_id`.
    async fn get_salts(&self, record_id: RecordId) -> StoreResult<Option<[Salt; FIELD_COUNT]>>;
}

/// Read-through accelerator for ledger lookups.
///
/// Infallible by contract: a cache that cannot answer reports a miss, and a
/// cache that cannot store simply drops the entry.
#[async_trait]
pub trait RootCache: Send + Sync {
    async fn get(&self, record_id: RecordId) -> Option<AnchoredRoot>;

    async fn put(&self, record_id: RecordId, anchored: AnchoredRoot, ttl: Duration);
}
