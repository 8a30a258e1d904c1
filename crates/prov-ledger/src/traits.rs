use async_trait::async_trait;
use prov_types::{AnchoredRoot, RecordId};

use crate::error::LedgerResult;

/// Append-only registry of commitment roots.
///
/// Implementations must reject a second registration under an existing
/// record id with [`LedgerError::DuplicateRecord`] and must never overwrite.
/// That rejection is what lets concurrent commits for the same id resolve to
/// exactly one winner.
///
/// [`LedgerError::DuplicateRecord`]: crate::LedgerError::DuplicateRecord
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn register(&self, record_id: RecordId, anchored: &AnchoredRoot) -> LedgerResult<()>;

    /// Returns `Ok(None)` if nothing is registered under `record_id`.
    async fn lookup(&self, record_id: RecordId) -> LedgerResult<Option<AnchoredRoot>>;
}
