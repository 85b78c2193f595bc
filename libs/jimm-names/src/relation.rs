//! Relations defined by the authorization model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// A relation between a subject and a target.
///
/// The set is closed: anything the relation store schema does not define
/// is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Relation {
    Administrator,
    Member,
    Reader,
    Writer,
    Consumer,
    AuditLogViewer,
    CanAddModel,
}

impl Relation {
    pub const ALL: [Relation; 7] = [
        Relation::Administrator,
        Relation::Member,
        Relation::Reader,
        Relation::Writer,
        Relation::Consumer,
        Relation::AuditLogViewer,
        Relation::CanAddModel,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Relation::Administrator => "administrator",
            Relation::Member => "member",
            Relation::Reader => "reader",
            Relation::Writer => "writer",
            Relation::Consumer => "consumer",
            Relation::AuditLogViewer => "audit_log_viewer",
            Relation::CanAddModel => "can_addmodel",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| TagError::UnknownRelation(s.to_owned()))
    }
}

impl TryFrom<String> for Relation {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Relation> for String {
    fn from(relation: Relation) -> Self {
        relation.as_str().to_owned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for relation in Relation::ALL {
            assert_eq!(relation.as_str().parse::<Relation>().unwrap(), relation);
        }
    }

    #[test]
    fn unknown_relation_is_rejected() {
        assert!(matches!(
            "owner".parse::<Relation>(),
            Err(TagError::UnknownRelation(r)) if r == "owner"
        ));
    }

    #[test]
    fn serializes_as_schema_name() {
        let json = serde_json::to_string(&Relation::AuditLogViewer).unwrap();
        assert_eq!(json, "\"audit_log_viewer\"");
        let back: Relation = serde_json::from_str("\"can_addmodel\"").unwrap();
        assert_eq!(back, Relation::CanAddModel);
    }
}
