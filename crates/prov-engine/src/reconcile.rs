use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use prov_types::{AnchoredRoot, RecordId};

use crate::collaborators::Collaborators;

/// Health of one record id as seen by a sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordHealth {
    /// Anchored and salted.
    Consistent,
    /// Anchored on the ledger with no salts. Unverifiable until the salts
    /// are restored.
    Orphaned { anchored: AnchoredRoot },
    /// Not on the ledger. `has_salts` flags leftovers from an interrupted
    /// commit that never reached registration.
    Unregistered { has_salts: bool },
    /// A collaborator could not answer for this id.
    Unreachable { reason: String },
}

/// Result of a sweep, one entry per id in the order swept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub entries: Vec<(RecordId, RecordHealth)>,
}

impl ReconciliationReport {
    /// Ids whose roots are anchored without salts.
    pub fn orphaned(&self) -> Vec<RecordId> {
        self.entries
            .iter()
            .filter(|(_, health)| matches!(health, RecordHealth::Orphaned { .. }))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids a collaborator could not answer for.
    pub fn unreachable(&self) -> Vec<RecordId> {
        self.entries
            .iter()
            .filter(|(_, health)| matches!(health, RecordHealth::Unreachable { .. }))
            .map(|(id, _)| *id)
            .collect()
    }

    /// No orphans and nothing unreachable.
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|(_, health)| {
            matches!(
                health,
                RecordHealth::Consistent | RecordHealth::Unregistered { .. }
            )
        })
    }

    pub fn health(&self, record_id: RecordId) -> Option<&RecordHealth> {
        self.entries
            .iter()
            .find(|(id, _)| *id == record_id)
            .map(|(_, health)| health)
    }
}

/// Read-only consistency sweep over ledger and salt store.
///
/// Finds records left behind by a fatal salt-persistence failure. It never
/// writes; repair is an operator decision.
#[derive(Clone, Debug)]
pub struct Reconciler {
    collaborators: Collaborators,
}

impl Reconciler {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    pub async fn sweep(&self, ids: impl IntoIterator<Item = RecordId>) -> ReconciliationReport {
        let mut report = ReconciliationReport::default();
        for id in ids {
            let health = self.check(id).await;
            if let RecordHealth::Orphaned { anchored } = &health {
                warn!(record_id = %id, root = %anchored.root, content_ref = %anchored.content_ref, "orphaned root");
            }
            report.entries.push((id, health));
        }
        info!(
            swept = report.entries.len(),
            orphaned = report.orphaned().len(),
            unreachable = report.unreachable().len(),
            "reconciliation sweep finished"
        );
        report
    }

    async fn check(&self, record_id: RecordId) -> RecordHealth {
        let anchored = match self.collaborators.ledger.lookup(record_id).await {
            Ok(anchored) => anchored,
            Err(e) => {
                return RecordHealth::Unreachable {
                    reason: e.to_string(),
                }
            }
        };
        let has_salts = match self.collaborators.salts.get_salts(record_id).await {
            Ok(salts) => salts.is_some(),
            Err(e) => {
                return RecordHealth::Unreachable {
                    reason: e.to_string(),
                }
            }
        };
        match anchored {
            Some(_) if has_salts => RecordHealth::Consistent,
            Some(anchored) => RecordHealth::Orphaned { anchored },
            None => RecordHealth::Unregistered { has_salts },
        }
    }
}
