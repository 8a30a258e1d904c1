use prov_types::{ContentRef, RecordId};

/// Errors from collaborator store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("{store} unavailable: {reason}")]
    Unavailable { store: &'static str, reason: String },

    /// No content exists under the given locator.
    #[error("content not found: {0}")]
    NotFound(ContentRef),

    /// Different salts are already recorded for this record.
    #[error("salts already recorded for record {0}")]
    Conflict(RecordId),
}

impl StoreError {
    pub fn unavailable(store: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            store,
            reason: reason.into(),
        }
    }

    /// Returns `true` if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
