use prov_types::{FieldValue, Record, RecordId, RecordSchema, FIELD_COUNT};

use crate::collaborators::{Collaborators, InMemoryBackends};
use crate::commit::CommitmentEngine;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::reconcile::{ReconciliationReport, Reconciler};
use crate::verify::{VerificationEngine, VerificationReport};

/// Commit, verify, and sweep over one set of collaborators.
///
/// The entry point for embedding applications and the HTTP surface.
#[derive(Clone, Debug)]
pub struct ProvenanceService {
    committer: CommitmentEngine,
    verifier: VerificationEngine,
    reconciler: Reconciler,
    config: EngineConfig,
}

impl ProvenanceService {
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> Self {
        Self {
            committer: CommitmentEngine::new(collaborators.clone(), config.clone()),
            verifier: VerificationEngine::new(collaborators.clone(), config.clone()),
            reconciler: Reconciler::new(collaborators),
            config,
        }
    }

    /// A service wired to fresh in-memory collaborators. The returned
    /// backends share state with the service.
    pub fn in_memory(config: EngineConfig) -> (Self, InMemoryBackends) {
        let backends = InMemoryBackends::new();
        (Self::new(backends.collaborators(), config), backends)
    }

    pub fn with_schema(self, schema: RecordSchema) -> Self {
        Self {
            committer: self.committer.with_schema(schema),
            verifier: self.verifier.with_schema(schema),
            ..self
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn schema(&self) -> &RecordSchema {
        self.committer.schema()
    }

    pub async fn commit(
        &self,
        record_id: RecordId,
        fields: [FieldValue; FIELD_COUNT],
    ) -> EngineResult<Record> {
        self.committer.commit(record_id, fields).await
    }

    pub async fn verify(&self, record_id: RecordId) -> EngineResult<VerificationReport> {
        self.verifier.verify(record_id).await
    }

    pub async fn sweep(&self, ids: impl IntoIterator<Item = RecordId>) -> ReconciliationReport {
        self.reconciler.sweep(ids).await
    }

    pub fn committer(&self) -> &CommitmentEngine {
        &self.committer
    }

    pub fn verifier(&self) -> &VerificationEngine {
        &self.verifier
    }
}
