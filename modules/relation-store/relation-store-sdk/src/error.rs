//! Error types for the relation store.

use jimm_names::TagError;

/// Errors returned by a [`RelationStoreClient`](crate::RelationStoreClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationStoreError {
    /// The request did not complete. Writes must be treated as
    /// indeterminate; retrying is safe because tuple writes are idempotent.
    #[error("relation store request failed: {0}")]
    RequestFailed(String),

    /// The caller stopped waiting for the request.
    #[error("relation store request cancelled")]
    Cancelled,

    /// A tuple does not fit the authorization model.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Malformed request, e.g. a zero page size or a foreign cursor.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RelationStoreError {
    /// Whether the same request may succeed if sent again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::Cancelled)
    }
}

/// Failure to parse the text form of a tuple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TupleParseError {
    #[error("tuple {0:?} is not of the form <object> <relation> <target>")]
    Malformed(String),

    #[error(transparent)]
    Tag(#[from] TagError),
}
