use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use prov_crypto::{digests_match, FixedTreeCombiner, SaltedLeafBuilder};
use prov_ledger::LedgerError;
use prov_store::StoreError;
use prov_types::{
    AnchoredRoot, ContentRef, Digest, FieldValue, RecordId, RecordSchema, Salt, FIELD_COUNT,
};

use crate::collaborators::Collaborators;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::retry::{bounded, with_retry, Exhausted};

/// Outcome of a completed verification. Both variants are successes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Authentic,
    Tampered,
}

impl Verdict {
    /// Human-facing summary, as shown to product scanners.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Authentic => "Authentic Product",
            Self::Tampered => "Tampered Product",
        }
    }
}

/// Where the anchored root was resolved from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSource {
    Cache,
    Ledger,
}

/// Audit record of one verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub record_id: RecordId,
    pub verdict: Verdict,
    pub anchored_root: Digest,
    pub recomputed_root: Digest,
    pub content_ref: ContentRef,
    pub source: RootSource,
    pub checked_at: DateTime<Utc>,
    /// Set when the fetched payload could not be read as a record at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationReport {
    pub fn is_authentic(&self) -> bool {
        self.verdict == Verdict::Authentic
    }
}

/// Checks fetched records against their anchored roots.
///
/// ```text
/// cache ──hit──────────────────────────────┐
///   └─miss─> ledger ──none──> RecordNotFound│
///              └─found─> salts? ──none──> SaltMissing
///                          └─yes─> cache put┴─> content fetch ─> recompute ─> compare
/// ```
#[derive(Clone, Debug)]
pub struct VerificationEngine {
    collaborators: Collaborators,
    config: EngineConfig,
    schema: RecordSchema,
    leaves: SaltedLeafBuilder,
    combiner: FixedTreeCombiner,
}

impl VerificationEngine {
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

    /// Verify under the configured operation timeout.
    pub async fn verify(&self, record_id: RecordId) -> EngineResult<VerificationReport> {
        let deadline = Instant::now() + self.config.operation_timeout();
        self.verify_with_deadline(record_id, deadline).await
    }

    /// Verify, giving up at `deadline`.
    pub async fn verify_with_deadline(
        &self,
        record_id: RecordId,
        deadline: Instant,
    ) -> EngineResult<VerificationReport> {
        let (anchored, salts, source) = self.resolve(record_id, deadline).await?;
        let payload = self.fetch_content(record_id, &anchored.content_ref, deadline).await?;

        let (recomputed_root, detail) = match self.schema.decode_payload(&payload) {
            Ok(fields) => (self.recompute(&salts, &fields)?, None),
            Err(e) => {
                warn!(record_id = %record_id, content_ref = %anchored.content_ref, error = %e, "fetched payload is not a record");
                (Digest::zero(), Some(format!("unreadable payload: {e}")))
            }
        };

        let verdict = if digests_match(&anchored.root, &recomputed_root) {
            Verdict::Authentic
        } else {
            Verdict::Tampered
        };
        info!(
            record_id = %record_id,
            verdict = ?verdict,
            source = ?source,
            root = %anchored.root,
            "record verified"
        );

        Ok(VerificationReport {
            record_id,
            verdict,
            anchored_root: anchored.root,
            recomputed_root,
            content_ref: anchored.content_ref,
            source,
            checked_at: Utc::now(),
            detail,
        })
    }

    fn recompute(
        &self,
        salts: &[Salt; FIELD_COUNT],
        fields: &[FieldValue; FIELD_COUNT],
    ) -> EngineResult<Digest> {
        let leaves: Vec<Digest> = salts
            .iter()
            .zip(fields)
            .map(|(salt, value)| self.leaves.leaf_with_salt(salt, value))
            .collect();
        Ok(self.combiner.root(&leaves)?)
    }

    /// Find the anchored root and the salts, consulting the cache first.
    async fn resolve(
        &self,
        record_id: RecordId,
        deadline: Instant,
    ) -> EngineResult<(AnchoredRoot, [Salt; FIELD_COUNT], RootSource)> {
        if let Some(cache) = &self.collaborators.cache {
            // A cache that cannot answer before the deadline counts as a miss.
            if let Some(anchored) = bounded(deadline, cache.get(record_id)).await.flatten() {
                debug!(record_id = %record_id, "root cache hit");
                let salts = self.load_salts(record_id, &anchored, deadline).await?;
                return Ok((anchored, salts, RootSource::Cache));
            }
        }

        let anchored = self.lookup_ledger(record_id, deadline).await?;
        let salts = self.load_salts(record_id, &anchored, deadline).await?;
        if let Some(cache) = &self.collaborators.cache {
            let ttl = self.config.cache_ttl();
            match bounded(deadline, cache.put(record_id, anchored.clone(), ttl)).await {
                Some(()) => debug!(record_id = %record_id, ttl_secs = self.config.cache_ttl_secs, "root cached"),
                None => warn!(record_id = %record_id, "cache write timed out; entry dropped"),
            }
        }
        Ok((anchored, salts, RootSource::Ledger))
    }

    async fn lookup_ledger(&self, record_id: RecordId, deadline: Instant) -> EngineResult<AnchoredRoot> {
        let ledger = &self.collaborators.ledger;
        let (found, _) = with_retry(
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
                stage: "ledger lookup",
            },
        })?;
        found.ok_or(EngineError::RecordNotFound(record_id))
    }

    async fn load_salts(
        &self,
        record_id: RecordId,
        anchored: &AnchoredRoot,
        deadline: Instant,
    ) -> EngineResult<[Salt; FIELD_COUNT]> {
        let store = &self.collaborators.salts;
        let (salts, _) = with_retry(
            &self.config.retry,
            deadline,
            "salt get",
            StoreError::is_transient,
            move || store.get_salts(record_id),
        )
        .await
        .map_err(|exhausted| match exhausted {
            Exhausted::Failed { error, attempts } => EngineError::SaltStoreUnavailable {
                record_id,
                attempts,
                source: error,
            },
            Exhausted::Deadline { .. } => EngineError::DeadlineExceeded {
                record_id,
                stage: "salt lookup",
            },
        })?;

        salts.ok_or_else(|| {
            error!(record_id = %record_id, root = %anchored.root, "anchored root has no salts");
            EngineError::SaltMissing {
                record_id,
                root: anchored.root,
            }
        })
    }

    async fn fetch_content(
        &self,
        record_id: RecordId,
        content_ref: &ContentRef,
        deadline: Instant,
    ) -> EngineResult<bytes::Bytes> {
        let content = &self.collaborators.content;
        let (payload, attempts) = with_retry(
            &self.config.retry,
            deadline,
            "content get",
            StoreError::is_transient,
            move || content.get(content_ref),
        )
        .await
        .map_err(|exhausted| match exhausted {
            Exhausted::Failed { error, attempts } => EngineError::ContentFetchFailure {
                record_id,
                content_ref: content_ref.clone(),
                attempts,
                source: error,
            },
            Exhausted::Deadline { .. } => EngineError::DeadlineExceeded {
                record_id,
                stage: "content fetch",
            },
        })?;
        debug!(record_id = %record_id, content_ref = %content_ref, attempts, bytes = payload.len(), "content fetched");
        Ok(payload)
    }
}
