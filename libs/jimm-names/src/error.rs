//! Tag parse and construction errors.

use crate::kind::Kind;
use crate::relation::Relation;

/// Reasons a tag can fail to parse or construct.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("unknown tag kind {0:?}")]
    UnknownKind(String),

    #[error("tag {0:?} is not of the form <kind>-<id>")]
    MissingSeparator(String),

    #[error("invalid {kind} id {id:?}: {reason}")]
    InvalidId {
        kind: Kind,
        id: String,
        reason: &'static str,
    },

    #[error("unknown relation {0:?}")]
    UnknownRelation(String),

    #[error("relation {relation} is not allowed on {kind} tags")]
    RelationNotAllowed { kind: Kind, relation: Relation },

    #[error("expected a {expected} tag, got {actual}")]
    UnexpectedKind { expected: Kind, actual: Kind },
}
