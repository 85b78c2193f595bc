//! The canonical `(kind, id, relation?)` identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TagError;
use crate::kind::Kind;
use crate::relation::Relation;

/// Domain reserved for service-account identities. User ids may not use it,
/// which keeps service-account client ids and user ids from colliding.
pub const SERVICE_ACCOUNT_DOMAIN: &str = "@serviceaccount";

/// Identifier of a principal or protected resource.
///
/// Rendered as `<kind>-<id>` with an optional `#<relation>` suffix. The
/// suffix is only valid on group tags, where `group-ops#member` denotes the
/// members of `ops` rather than the group itself.
///
/// ```
/// use jimm_names::{Kind, Relation, Tag};
///
/// let tag: Tag = "group-ops#member".parse().unwrap();
/// assert_eq!(tag.kind(), Kind::Group);
/// assert_eq!(tag.id(), "ops");
/// assert_eq!(tag.relation(), Some(Relation::Member));
/// assert_eq!(tag.to_string(), "group-ops#member");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag {
    kind: Kind,
    id: String,
    relation: Option<Relation>,
}

impl Tag {
    /// Build a bare tag, validating `id` for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidId`] if the id fails the kind's rules.
    pub fn new(kind: Kind, id: impl Into<String>) -> Result<Self, TagError> {
        let id = id.into();
        validate_id(kind, &id)?;
        Ok(Self {
            kind,
            id,
            relation: None,
        })
    }

    /// Attach a subject-side relation qualifier.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::RelationNotAllowed`] unless this is a group tag.
    pub fn with_relation(mut self, relation: Relation) -> Result<Self, TagError> {
        if self.kind != Kind::Group {
            return Err(TagError::RelationNotAllowed {
                kind: self.kind,
                relation,
            });
        }
        self.relation = Some(relation);
        Ok(self)
    }

    /// Subject-side form of a group: `group-<id>#member`.
    ///
    /// Tags of any other kind are returned unchanged.
    #[must_use]
    pub fn into_group_members(mut self) -> Self {
        if self.kind == Kind::Group {
            self.relation = Some(Relation::Member);
        }
        self
    }

    /// Drop the relation qualifier, if any.
    #[must_use]
    pub fn without_relation(mut self) -> Self {
        self.relation = None;
        self
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn relation(&self) -> Option<Relation> {
        self.relation
    }
}

fn validate_id(kind: Kind, id: &str) -> Result<(), TagError> {
    let invalid = |reason| TagError::InvalidId {
        kind,
        id: id.to_owned(),
        reason,
    };

    if id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    if id.contains('#') {
        return Err(invalid("must not contain '#'"));
    }

    match kind {
        Kind::User if id.ends_with(SERVICE_ACCOUNT_DOMAIN) => {
            Err(invalid("domain is reserved for service accounts"))
        }
        Kind::ServiceAccount if id.contains('@') => {
            Err(invalid("client id must not contain '@'"))
        }
        Kind::Group
            if !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) =>
        {
            Err(invalid("may only contain ASCII letters, digits, '-', '_' and '.'"))
        }
        _ => Ok(()),
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)?;
        if let Some(relation) = self.relation {
            write!(f, "#{relation}")?;
        }
        Ok(())
    }
}

impl FromStr for Tag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((prefix, rest)) = s.split_once('-') else {
            return Err(TagError::MissingSeparator(s.to_owned()));
        };
        let kind: Kind = prefix.parse()?;

        match rest.split_once('#') {
            Some((id, relation)) => Tag::new(kind, id)?.with_relation(relation.parse()?),
            None => Tag::new(kind, rest),
        }
    }
}

impl TryFrom<String> for Tag {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

/// Projection of a domain entity onto its canonical tag.
pub trait ToTag {
    fn to_tag(&self) -> Tag;
}

impl ToTag for Tag {
    fn to_tag(&self) -> Tag {
        self.clone()
    }
}
