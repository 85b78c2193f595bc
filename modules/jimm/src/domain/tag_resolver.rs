//! Resolution of user-supplied entity strings into tags.

use async_trait::async_trait;
use jimm_names::Tag;

use crate::error::JimmError;
use crate::principal::RequestContext;

/// Turns user-supplied entity references into canonical tags.
///
/// Deployments that accept human-friendly names (a model name rather than
/// its UUID) inject a resolver that looks them up; the default only
/// accepts canonical text.
#[async_trait]
pub trait TagResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`JimmError::InvalidTag`] if `text` names no valid entity.
    async fn resolve(&self, ctx: &RequestContext, text: &str) -> Result<Tag, JimmError>;
}

/// Parses the canonical `<kind>-<id>[#<relation>]` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalTagResolver;

#[async_trait]
impl TagResolver for CanonicalTagResolver {
    async fn resolve(&self, _ctx: &RequestContext, text: &str) -> Result<Tag, JimmError> {
        Ok(text.parse::<Tag>()?)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::principal::User;
    use jimm_names::{Kind, UserTag};

    fn ctx() -> RequestContext {
        RequestContext::new(User::new(UserTag::new("alice").unwrap()))
    }

    #[tokio::test]
    async fn canonical_resolver_parses_tags() {
        let tag = CanonicalTagResolver
            .resolve(&ctx(), "group-ops#member")
            .await
            .unwrap();
        assert_eq!(tag.kind(), Kind::Group);
        assert_eq!(tag.to_string(), "group-ops#member");
    }

    #[tokio::test]
    async fn canonical_resolver_rejects_names() {
        let err = CanonicalTagResolver
            .resolve(&ctx(), "my-model")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTag);
    }
}
