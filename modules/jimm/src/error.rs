//! Error taxonomy surfaced by the authorization core.

use std::fmt;

use http::StatusCode;
use jimm_names::TagError;
use relation_store_sdk::RelationStoreError;
use serde::{Deserialize, Serialize};

/// Identifiers prefixed onto errors surfaced by core operations.
pub mod ops {
    pub const ADD_SERVICE_ACCOUNT: &str = "jimm.AddServiceAccount";
    pub const GRANT_SERVICE_ACCOUNT_ACCESS: &str = "jimm.GrantServiceAccountAccess";
    pub const CHECK_PERMISSION: &str = "jimm.CheckPermission";
    pub const PARSE_TAG: &str = "jimm.ParseTag";
}

/// Stable identifier of an error kind, independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Unauthorized,
    AlreadyExists,
    AlreadyOwned,
    InvalidTag,
    InvalidEntity,
    RequestFailed,
    NotImplemented,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::AlreadyExists => "already_exists",
            Self::AlreadyOwned => "already_owned",
            Self::InvalidTag => "invalid_tag",
            Self::InvalidEntity => "invalid_entity",
            Self::RequestFailed => "request_failed",
            Self::NotImplemented => "not_implemented",
        }
    }

    /// Status an HTTP boundary should answer with.
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::InvalidTag | Self::InvalidEntity => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists | Self::AlreadyOwned => StatusCode::CONFLICT,
            Self::RequestFailed => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the authorization core.
///
/// Compare errors by [`code`](Self::code), never by message. Errors leaving
/// a core operation are wrapped in [`JimmError::Op`] naming that operation;
/// `code`, [`store_error`](Self::store_error) and
/// [`tag_error`](Self::tag_error) look through the wrapping.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JimmError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("service account {0} already owned")]
    AlreadyOwned(String),

    #[error("invalid tag: {0}")]
    InvalidTag(#[from] TagError),

    #[error("invalid entity {entity}: {reason}")]
    InvalidEntity { entity: String, reason: String },

    #[error(transparent)]
    RequestFailed(#[from] RelationStoreError),

    #[error("{0} not implemented")]
    NotImplemented(&'static str),

    #[error("{op}: {source}")]
    Op {
        op: &'static str,
        #[source]
        source: Box<JimmError>,
    },
}

impl JimmError {
    pub(crate) fn invalid_entity(entity: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    /// Prefix this error with the operation it surfaced from.
    #[must_use]
    pub fn with_op(self, op: &'static str) -> Self {
        Self::Op {
            op,
            source: Box::new(self),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::AlreadyOwned(_) => ErrorCode::AlreadyOwned,
            Self::InvalidTag(_) => ErrorCode::InvalidTag,
            Self::InvalidEntity { .. } => ErrorCode::InvalidEntity,
            Self::RequestFailed(_) => ErrorCode::RequestFailed,
            Self::NotImplemented(_) => ErrorCode::NotImplemented,
            Self::Op { source, .. } => source.code(),
        }
    }

    /// The outermost operation identifier, if any.
    #[must_use]
    pub fn op(&self) -> Option<&'static str> {
        match self {
            Self::Op { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// The error with every operation prefix removed.
    #[must_use]
    pub fn root(&self) -> &JimmError {
        match self {
            Self::Op { source, .. } => source.root(),
            other => other,
        }
    }

    /// The relation store error behind a `RequestFailed`.
    #[must_use]
    pub fn store_error(&self) -> Option<&RelationStoreError> {
        match self.root() {
            Self::RequestFailed(e) => Some(e),
            _ => None,
        }
    }

    /// The parse error behind an `InvalidTag`.
    #[must_use]
    pub fn tag_error(&self) -> Option<&TagError> {
        match self.root() {
            Self::InvalidTag(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }
}
