use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use prov_store::FaultInjector;
use prov_types::{AnchoredRoot, RecordId};

use crate::entry::LedgerEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::traits::Ledger;

/// In-memory ledger for tests, local demos, and embedding.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
    register_faults: FaultInjector,
    lookup_faults: FaultInjector,
}

#[derive(Default)]
struct LedgerState {
    entries: BTreeMap<RecordId, LedgerEntry>,
    next_seq: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            register_faults: FaultInjector::new(),
            lookup_faults: FaultInjector::new(),
        }
    }

    /// Failure script for `register`.
    pub fn register_faults(&self) -> &FaultInjector {
        &self.register_faults
    }

    /// Failure script for `lookup`.
    pub fn lookup_faults(&self) -> &FaultInjector {
        &self.lookup_faults
    }

    /// Full audit entry for a record, if registered.
    pub fn entry(&self, record_id: RecordId) -> LedgerResult<Option<LedgerEntry>> {
        let state = self.read_state()?;
        Ok(state.entries.get(&record_id).cloned())
    }

    /// Every registered record id, ascending.
    pub fn record_ids(&self) -> LedgerResult<Vec<RecordId>> {
        let state = self.read_state()?;
        Ok(state.entries.keys().copied().collect())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_state(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger read lock poisoned".into()))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn register(&self, record_id: RecordId, anchored: &AnchoredRoot) -> LedgerResult<()> {
        if self.register_faults.trip() {
            return Err(LedgerError::Unavailable("injected register failure".into()));
        }

        let mut state = self
            .inner
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger write lock poisoned".into()))?;

        if state.entries.contains_key(&record_id) {
            return Err(LedgerError::DuplicateRecord(record_id));
        }

        state.next_seq += 1;
        let entry = LedgerEntry {
            record_id,
            anchored: anchored.clone(),
            seq: state.next_seq,
            registered_at: Utc::now(),
        };
        tracing::trace!(record_id = %record_id, seq = entry.seq, "root registered");
        state.entries.insert(record_id, entry);
        Ok(())
    }

    async fn lookup(&self, record_id: RecordId) -> LedgerResult<Option<AnchoredRoot>> {
        if self.lookup_faults.trip() {
            return Err(LedgerError::Unavailable("injected lookup failure".into()));
        }
        let state = self.read_state()?;
        Ok(state.entries.get(&record_id).map(|e| e.anchored.clone()))
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("entry_count", &self.len())
            .finish()
    }
}
