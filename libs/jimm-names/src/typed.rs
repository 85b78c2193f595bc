//! Kind-checked wrappers around [`Tag`].
//!
//! These are what domain code passes around when only one kind makes
//! sense, e.g. the service account a grant applies to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TagError;
use crate::kind::Kind;
use crate::tag::{Tag, ToTag};

macro_rules! typed_tag {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Tag", into = "Tag")]
        pub struct $name(Tag);

        impl $name {
            pub const KIND: Kind = $kind;

            /// # Errors
            ///
            /// Returns [`TagError::InvalidId`] if `id` is not valid for this kind.
            pub fn new(id: impl Into<String>) -> Result<Self, TagError> {
                Tag::new(Self::KIND, id).map(Self)
            }

            #[must_use]
            pub fn id(&self) -> &str {
                self.0.id()
            }

            #[must_use]
            pub fn as_tag(&self) -> &Tag {
                &self.0
            }
        }

        impl ToTag for $name {
            fn to_tag(&self) -> Tag {
                self.0.clone()
            }
        }

        impl TryFrom<Tag> for $name {
            type Error = TagError;

            fn try_from(tag: Tag) -> Result<Self, Self::Error> {
                if tag.kind() != Self::KIND {
                    return Err(TagError::UnexpectedKind {
                        expected: Self::KIND,
                        actual: tag.kind(),
                    });
                }
                if let Some(relation) = tag.relation() {
                    return Err(TagError::RelationNotAllowed {
                        kind: tag.kind(),
                        relation,
                    });
                }
                Ok(Self(tag))
            }
        }

        impl From<$name> for Tag {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = TagError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<Tag>()?.try_into()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

typed_tag!(
    /// A user identity, e.g. `user-alice@canonical.com`.
    UserTag,
    Kind::User
);

typed_tag!(
    /// A group used as a resource, e.g. `group-ops`.
    GroupTag,
    Kind::Group
);

typed_tag!(
    /// A service account identified by its OAuth client id.
    ServiceAccountTag,
    Kind::ServiceAccount
);

impl GroupTag {
    /// The subject-side form denoting every member of the group.
    #[must_use]
    pub fn members(&self) -> Tag {
        self.0.clone().into_group_members()
    }
}
