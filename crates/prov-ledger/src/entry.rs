use chrono::{DateTime, Utc};
use prov_types::{AnchoredRoot, RecordId};
use serde::{Deserialize, Serialize};

/// One registration as the ledger recorded it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub record_id: RecordId,
    pub anchored: AnchoredRoot,
    /// Position in registration order (1-based, monotonic).
    pub seq: u64,
    pub registered_at: DateTime<Utc>,
}
