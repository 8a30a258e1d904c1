use prov_crypto::TreeError;
use prov_ledger::LedgerError;
use prov_store::StoreError;
use prov_types::{ContentRef, Digest, RecordId, TypeError};

/// Coarse classification of engine failures.
///
/// Callers branch on this rather than on individual variants: availability
/// failures may be retried, consistency failures need an operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Input rejected before any collaborator was touched.
    Validation,
    /// Wrong leaf count reached the combiner. A programming error.
    Construction,
    /// The record id is already committed.
    Conflict,
    /// The record id is unknown to the ledger.
    NotFound,
    /// A collaborator failed after bounded retries.
    Availability,
    /// The caller's deadline passed before the operation finished.
    Deadline,
    /// A root is, or may be, anchored without a confirmed way to reproduce it.
    Consistency,
}

/// Errors produced by commit and verify.
///
/// A tampered record is not an error; it is a successful verification
/// with a [`Verdict::Tampered`](crate::Verdict::Tampered) outcome.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid field: {0}")]
    InvalidField(#[from] TypeError),

    #[error("tree construction failed: {0}")]
    Construction(#[from] TreeError),

    #[error("record {0} is already committed")]
    DuplicateRecord(RecordId),

    #[error("content store failed for record {record_id} after {attempts} attempt(s): {source}")]
    ContentStoreFailure {
        record_id: RecordId,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("ledger failed for record {record_id}: {source}")]
    LedgerFailure {
        record_id: RecordId,
        #[source]
        source: LedgerError,
    },

    /// The root is anchored but the salts were not persisted. The record
    /// cannot be verified until the salts are restored out of band.
    #[error(
        "FATAL: root {root} for record {record_id} is anchored at {content_ref} but its salts were not persisted: {source}"
    )]
    SaltPersistFailure {
        record_id: RecordId,
        root: Digest,
        content_ref: ContentRef,
        #[source]
        source: StoreError,
    },

    /// Registration outlived its deadline and a follow-up lookup could not
    /// show whether the root landed. The salts were written regardless, so a
    /// root that did land stays verifiable.
    #[error(
        "FATAL: registration of root {root} for record {record_id} (content {content_ref}) timed out and could not be confirmed; salts persisted: {salts_persisted}"
    )]
    RegistrationUnconfirmed {
        record_id: RecordId,
        root: Digest,
        content_ref: ContentRef,
        salts_persisted: bool,
    },

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    #[error("content {content_ref} for record {record_id} could not be fetched after {attempts} attempt(s): {source}")]
    ContentFetchFailure {
        record_id: RecordId,
        content_ref: ContentRef,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("salt store failed for record {record_id} after {attempts} attempt(s): {source}")]
    SaltStoreUnavailable {
        record_id: RecordId,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// The ledger holds a root for this record but no salts exist for it.
    #[error("FATAL: record {record_id} has anchored root {root} but no salts")]
    SaltMissing { record_id: RecordId, root: Digest },

    #[error("deadline exceeded for record {record_id} during {stage}")]
    DeadlineExceeded {
        record_id: RecordId,
        stage: &'static str,
    },
}

impl EngineError {
    pub fn kind(&self) -> ErrorClass {
        match self {
            Self::InvalidField(_) => ErrorClass::Validation,
            Self::Construction(_) => ErrorClass::Construction,
            Self::DuplicateRecord(_) => ErrorClass::Conflict,
            Self::RecordNotFound(_) => ErrorClass::NotFound,
            Self::ContentStoreFailure { .. }
            | Self::LedgerFailure { .. }
            | Self::ContentFetchFailure { .. }
            | Self::SaltStoreUnavailable { .. } => ErrorClass::Availability,
            Self::DeadlineExceeded { .. } => ErrorClass::Deadline,
            Self::SaltPersistFailure { .. }
            | Self::RegistrationUnconfirmed { .. }
            | Self::SaltMissing { .. } => ErrorClass::Consistency,
        }
    }

    /// Returns `true` if repeating the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorClass::Availability | ErrorClass::Deadline)
    }

    /// Returns `true` for an anchored root that can no longer be reproduced.
    pub fn is_fatal_inconsistency(&self) -> bool {
        self.kind() == ErrorClass::Consistency
    }

    /// The record this error concerns, when known.
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::InvalidField(_) | Self::Construction(_) => None,
            Self::DuplicateRecord(id) | Self::RecordNotFound(id) => Some(*id),
            Self::ContentStoreFailure { record_id, .. }
            | Self::LedgerFailure { record_id, .. }
            | Self::SaltPersistFailure { record_id, .. }
            | Self::RegistrationUnconfirmed { record_id, .. }
            | Self::ContentFetchFailure { record_id, .. }
            | Self::SaltStoreUnavailable { record_id, .. }
            | Self::SaltMissing { record_id, .. }
            | Self::DeadlineExceeded { record_id, .. } => Some(*record_id),
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_errors_are_fatal_and_not_retryable() {
        let err = EngineError::SaltMissing {
            record_id: RecordId(1),
            root: Digest::zero(),
        };
        assert!(err.is_fatal_inconsistency());
        assert!(!err.is_retryable());
        assert_eq!(err.record_id(), Some(RecordId(1)));
    }

    #[test]
    fn availability_errors_are_retryable() {
        let err = EngineError::ContentStoreFailure {
            record_id: RecordId(2),
            attempts: 3,
            source: StoreError::unavailable("content store", "down"),
        };
        assert!(err.is_retryable());
        assert!(!err.is_fatal_inconsistency());
        assert!(err.to_string().contains("after 3 attempt(s)"));
    }

    #[test]
    fn conflict_is_neither() {
        let err = EngineError::DuplicateRecord(RecordId(3));
        assert_eq!(err.kind(), ErrorClass::Conflict);
        assert!(!err.is_retryable());
        assert!(!err.is_fatal_inconsistency());
    }

    #[test]
    fn salt_persist_failure_names_what_to_repair() {
        let err = EngineError::SaltPersistFailure {
            record_id: RecordId(4),
            root: Digest::from_hash([0xaa; 32]),
            content_ref: ContentRef::new("cid-4"),
            source: StoreError::unavailable("salt store", "down"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("FATAL"));
        assert!(msg.contains(&"aa".repeat(32)));
        assert!(msg.contains("cid-4"));
    }

    #[test]
    fn unconfirmed_registration_is_fatal_not_retryable() {
        let err = EngineError::RegistrationUnconfirmed {
            record_id: RecordId(5),
            root: Digest::from_hash([0xbb; 32]),
            content_ref: ContentRef::new("cid-5"),
            salts_persisted: true,
        };
        assert_eq!(err.kind(), ErrorClass::Consistency);
        assert!(!err.is_retryable());
        assert_eq!(err.record_id(), Some(RecordId(5)));
        let msg = err.to_string();
        assert!(msg.starts_with("FATAL"));
        assert!(msg.contains(&"bb".repeat(32)));
        assert!(msg.contains("cid-5"));
    }
}
