//! The authenticated subject of a request.

use jimm_names::{GroupTag, Tag, ToTag, UserTag};
use tokio_util::sync::CancellationToken;

/// An authenticated user.
///
/// Produced once per request by an [`Authenticator`](crate::auth::Authenticator)
/// and passed down unchanged. Group memberships, when present, are what the
/// identity provider asserted at login; authorization decisions never rely
/// on them, the relation store is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    tag: UserTag,
    display_name: Option<String>,
    groups: Option<Vec<GroupTag>>,
}

impl User {
    #[must_use]
    pub fn new(tag: UserTag) -> Self {
        Self {
            tag,
            display_name: None,
            groups: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_groups(mut self, groups: Vec<GroupTag>) -> Self {
        self.groups = Some(groups);
        self
    }

    #[must_use]
    pub fn tag(&self) -> &UserTag {
        &self.tag
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.tag.id()
    }

    /// Display name, falling back to the user id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.tag.id())
    }

    /// Cached group memberships, `None` if never resolved.
    #[must_use]
    pub fn groups(&self) -> Option<&[GroupTag]> {
        self.groups.as_deref()
    }
}

impl ToTag for User {
    fn to_tag(&self) -> Tag {
        self.tag.to_tag()
    }
}

/// Per-request state threaded through every core operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    principal: User,
    cancel: CancellationToken,
}

impl RequestContext {
    /// A context that is never cancelled.
    #[must_use]
    pub fn new(principal: User) -> Self {
        Self::with_cancellation(principal, CancellationToken::new())
    }

    #[must_use]
    pub fn with_cancellation(principal: User, cancel: CancellationToken) -> Self {
        Self { principal, cancel }
    }

    #[must_use]
    pub fn principal(&self) -> &User {
        &self.principal
    }

    #[must_use]
    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn user_projects_onto_its_tag() {
        let user = User::new(UserTag::new("alice@canonical.com").unwrap());
        assert_eq!(user.to_tag().to_string(), "user-alice@canonical.com");
        assert_eq!(user.display_name(), "alice@canonical.com");
        assert_eq!(user.groups(), None);
    }

    #[test]
    fn user_keeps_display_name_and_groups() {
        let user = User::new(UserTag::new("bob").unwrap())
            .with_display_name("Bob")
            .with_groups(vec![GroupTag::new("ops").unwrap()]);

        assert_eq!(user.display_name(), "Bob");
        assert_eq!(user.groups().map(<[GroupTag]>::len), Some(1));
    }
}
