use prov_types::RecordId;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A root is already registered under this record id.
    #[error("record {0} is already registered")]
    DuplicateRecord(RecordId),

    /// The ledger could not be reached or did not accept the transaction.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
