use bytes::Bytes;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use prov_crypto::{FixedTreeCombiner, SaltedLeafBuilder};
use prov_ledger::LedgerError;
use prov_store::StoreError;
use prov_types::{
    AnchoredRoot, Digest, FieldValue, Record, RecordId, RecordSchema, Salt, FIELD_COUNT,
};

use crate::collaborators::Collaborators;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::retry::{bounded, with_retry, Exhausted};

/// How a registration ended, with the deadline left for the salt write.
enum Registration {
    Landed(Instant),
    Unsettled(Instant),
}

/// Produces and anchors salted commitments.
///
/// Steps run strictly in order and each one's success is the precondition
/// for the next:
///
/// 1. salt and hash each field, in schema order
/// 2. combine the four leaves into a root
/// 3. upload the payload (bounded retry); failure stops here with nothing anchored
/// 4. register the root on the ledger (never retried)
/// 5. persist the salts (bounded retry); failure here is fatal
///
/// A registration that outlives the deadline is settled by a ledger lookup
/// within [`EngineConfig::registration_confirm`]. A landed root moves on to
/// step 5 inside that window; an unsettled one is reported as
/// [`EngineError::RegistrationUnconfirmed`].
#[derive(Clone, Debug)]
pub struct CommitmentEngine {
    collaborators: Collaborators,
    config: EngineConfig,
    schema: RecordSchema,
    leaves: SaltedLeafBuilder,
    combiner: FixedTreeCombiner,
}

impl CommitmentEngine {
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> Self {
        Self {
            collaborators,
            config,
            schema: RecordSchema::PRODUCT,
            leaves: SaltedLeafBuilder::new(),
            combiner: FixedTreeCombiner::product(),
        }
    }

    pub fn with_schema(mut self, schema: RecordSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Commit under the configured operation timeout.
    pub async fn commit(
        &self,
        record_id: RecordId,
        fields: [FieldValue; FIELD_COUNT],
    ) -> EngineResult<Record> {
        let deadline = Instant::now() + self.config.operation_timeout();
        self.commit_with_deadline(record_id, fields, deadline).await
    }

    /// Commit, giving up at `deadline`.
    pub async fn commit_with_deadline(
        &self,
        record_id: RecordId,
        fields: [FieldValue; FIELD_COUNT],
        deadline: Instant,
    ) -> EngineResult<Record> {
        let fields = self.schema.normalize(&fields)?;
        self.ensure_unregistered(record_id, deadline).await?;

        let mut salts = [Salt::from_bytes([0; 16]); FIELD_COUNT];
        let mut leaves = [Digest::zero(); FIELD_COUNT];
        for (i, value) in fields.iter().enumerate() {
            let (salt, leaf) = self.leaves.leaf(value);
            salts[i] = salt;
            leaves[i] = leaf;
        }
        let root = self.combiner.root(&leaves)?;
        debug!(record_id = %record_id, root = %root, "commitment root computed");

        let payload = Bytes::from(self.schema.encode_payload(&fields)?);
        let content_ref = self.store_content(record_id, payload, deadline).await?;

        let anchored = AnchoredRoot::new(root, content_ref.clone());
        let salts_deadline = match self.register_root(record_id, &anchored, deadline).await? {
            Registration::Landed(remaining) => remaining,
            Registration::Unsettled(remaining) => {
                // Salts go in anyway so a root that lands later stays verifiable.
                let salts_persisted = self
                    .persist_salts(record_id, &salts, &anchored, remaining)
                    .await
                    .is_ok();
                error!(
                    record_id = %record_id,
                    root = %root,
                    content_ref = %content_ref,
                    salts_persisted,
                    "ledger registration outcome unknown"
                );
                return Err(EngineError::RegistrationUnconfirmed {
                    record_id,
                    root,
                    content_ref,
                    salts_persisted,
                });
            }
        };

        self.persist_salts(record_id, &salts, &anchored, salts_deadline).await?;

        info!(record_id = %record_id, root = %root, content_ref = %content_ref, "record committed");
        Ok(Record {
            record_id,
            fields,
            salts,
            content_ref,
            root,
        })
    }

    /// Reject ids the ledger already knows before any content is written.
    /// The ledger's own duplicate check at registration still settles races.
    async fn ensure_unregistered(&self, record_id: RecordId, deadline: Instant) -> EngineResult<()> {
        let ledger = &self.collaborators.ledger;
        let existing = with_retry(
            &self.config.retry,
            deadline,
            "ledger lookup",
            |e: &LedgerError| matches!(e, LedgerError::Unavailable(_)),
            move || ledger.lookup(record_id),
        )
        .await
        .map_err(|exhausted| match exhausted {
            Exhausted::Failed { error, .. } => EngineError::LedgerFailure {
                record_id,
                source: error,
            },
            Exhausted::Deadline { .. } => EngineError::DeadlineExceeded {
                record_id,
                stage: "duplicate check",
            },
        })?;

        match existing {
            (Some(_), _) => {
                debug!(record_id = %record_id, "record already anchored");
                Err(EngineError::DuplicateRecord(record_id))
            }
            (None, _) => Ok(()),
        }
    }

    async fn store_content(
        &self,
        record_id: RecordId,
        payload: Bytes,
        deadline: Instant,
    ) -> EngineResult<prov_types::ContentRef> {
        let content = &self.collaborators.content;
        let (content_ref, attempts) = with_retry(
            &self.config.retry,
            deadline,
            "content put",
            StoreError::is_transient,
            move || content.put(payload.clone()),
        )
        .await
        .map_err(|exhausted| match exhausted {
            Exhausted::Failed { error, attempts } => EngineError::ContentStoreFailure {
                record_id,
                attempts,
                source: error,
            },
            Exhausted::Deadline { .. } => EngineError::DeadlineExceeded {
                record_id,
                stage: "content upload",
            },
        })?;
        debug!(record_id = %record_id, content_ref = %content_ref, attempts, "content stored");
        Ok(content_ref)
    }

    async fn register_root(
        &self,
        record_id: RecordId,
        anchored: &AnchoredRoot,
        deadline: Instant,
    ) -> EngineResult<Registration> {
        let registered = bounded(deadline, self.collaborators.ledger.register(record_id, anchored)).await;
        match registered {
            Some(Ok(())) => {
                debug!(record_id = %record_id, "root registered on ledger");
                Ok(Registration::Landed(deadline))
            }
            Some(Err(LedgerError::DuplicateRecord(id))) => {
                debug!(record_id = %record_id, "lost registration race");
                Err(EngineError::DuplicateRecord(id))
            }
            Some(Err(source)) => Err(EngineError::LedgerFailure { record_id, source }),
            None => self.confirm_registration(record_id, anchored).await,
        }
    }

    /// Settle a registration that outlived its deadline by reading it back.
    async fn confirm_registration(
        &self,
        record_id: RecordId,
        anchored: &AnchoredRoot,
    ) -> EngineResult<Registration> {
        warn!(record_id = %record_id, root = %anchored.root, "ledger registration timed out; confirming by lookup");
        let window = Instant::now() + self.config.registration_confirm();
        let ledger = &self.collaborators.ledger;
        let found = with_retry(
            &self.config.retry,
            window,
            "ledger confirm",
            |e: &LedgerError| matches!(e, LedgerError::Unavailable(_)),
            move || ledger.lookup(record_id),
        )
        .await;

        match found {
            Ok((Some(entry), _)) if entry == *anchored => {
                info!(record_id = %record_id, "late registration confirmed");
                Ok(Registration::Landed(window))
            }
            Ok((Some(_), _)) => {
                debug!(record_id = %record_id, "a different root holds the record id");
                Err(EngineError::DuplicateRecord(record_id))
            }
            Ok((None, _)) | Err(_) => Ok(Registration::Unsettled(window)),
        }
    }

    async fn persist_salts(
        &self,
        record_id: RecordId,
        salts: &[Salt; FIELD_COUNT],
        anchored: &AnchoredRoot,
        deadline: Instant,
    ) -> EngineResult<()> {
        let store = &self.collaborators.salts;
        let outcome = with_retry(
            &self.config.retry,
            deadline,
            "salt put",
            StoreError::is_transient,
            move || store.put_salts(record_id, salts),
        )
        .await;

        let source = match outcome {
            Ok(((), attempts)) => {
                debug!(record_id = %record_id, attempts, "salts persisted");
                return Ok(());
            }
            Err(Exhausted::Failed { error, .. }) => error,
            Err(Exhausted::Deadline { .. }) => StoreError::unavailable(
                "salt store",
                "deadline exceeded before salts were persisted",
            ),
        };

        error!(
            record_id = %record_id,
            root = %anchored.root,
            content_ref = %anchored.content_ref,
            error = %source,
            "root anchored without salts; record is unverifiable until repaired"
        );
        Err(EngineError::SaltPersistFailure {
            record_id,
            root: anchored.root,
            content_ref: anchored.content_ref.clone(),
            source,
        })
    }
}
