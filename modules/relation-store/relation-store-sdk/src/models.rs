//! Tuples and read requests exchanged with the relation store.

use std::fmt;
use std::str::FromStr;

use jimm_names::{Relation, Tag};
use serde::{Deserialize, Serialize};

use crate::error::TupleParseError;

/// Largest page a store will return from a single read.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A directed relationship: `object` holds `relation` on `target`.
///
/// Renders as `<object> <relation> <target>`, e.g.
/// `user-alice administrator serviceaccount-acme-bot`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tuple {
    /// The subject (who).
    pub object: Tag,
    /// The relation the subject holds.
    pub relation: Relation,
    /// The resource (what).
    pub target: Tag,
}

impl Tuple {
    #[must_use]
    pub fn new(object: Tag, relation: Relation, target: Tag) -> Self {
        Self {
            object,
            relation,
            target,
        }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.object, self.relation, self.target)
    }
}

impl FromStr for Tuple {
    type Err = TupleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        let (Some(object), Some(relation), Some(target), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TupleParseError::Malformed(s.to_owned()));
        };

        Ok(Self {
            object: object.parse()?,
            relation: relation.parse()?,
            target: target.parse()?,
        })
    }
}

/// Partial tuple key used to enumerate related objects.
///
/// Relation and target are always set; the object is a wildcard unless
/// narrowed with [`TupleFilter::with_object`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleFilter {
    pub object: Option<Tag>,
    pub relation: Relation,
    pub target: Tag,
}

impl TupleFilter {
    #[must_use]
    pub fn new(relation: Relation, target: Tag) -> Self {
        Self {
            object: None,
            relation,
            target,
        }
    }

    #[must_use]
    pub fn with_object(mut self, object: Tag) -> Self {
        self.object = Some(object);
        self
    }

    /// Whether `tuple` falls under this key.
    #[must_use]
    pub fn matches(&self, tuple: &Tuple) -> bool {
        tuple.relation == self.relation
            && tuple.target == self.target
            && self.object.as_ref().is_none_or(|o| *o == tuple.object)
    }
}

/// One page of a [`read_related_objects`](crate::RelationStoreClient::read_related_objects) call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPage {
    pub tuples: Vec<Tuple>,
    /// Opaque continuation; `None` once the result set is exhausted.
    pub next_cursor: Option<String>,
}
