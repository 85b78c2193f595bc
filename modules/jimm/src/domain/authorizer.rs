//! Policy layer between core operations and the relation store.

use std::collections::BTreeMap;
use std::sync::Arc;

use jimm_names::{Kind, Relation, Tag, ToTag};
use relation_store_sdk::{RelationStoreClient, Tuple, schema};

use crate::error::{JimmError, ops};
use crate::principal::RequestContext;

/// Answers "may this subject hold this relation on that resource?".
///
/// Transitive closure (group membership, relation implication) is left to
/// the store: every question is a single `check`. Positive answers may be
/// cached by callers; negative answers never are.
#[derive(Clone)]
pub struct Authorizer {
    store: Arc<dyn RelationStoreClient>,
    trace: bool,
}

impl Authorizer {
    #[must_use]
    pub fn new(store: Arc<dyn RelationStoreClient>, trace: bool) -> Self {
        Self { store, trace }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn RelationStoreClient> {
        &self.store
    }

    /// Whether `object` holds `relation` on `target`.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailed` if the store cannot answer.
    pub async fn check_relation(
        &self,
        ctx: &RequestContext,
        object: &Tag,
        relation: Relation,
        target: &Tag,
    ) -> Result<bool, JimmError> {
        let tuple = Tuple::new(object.clone(), relation, target.clone());
        let allowed = self.store.check(ctx.cancel(), &tuple, self.trace).await?;
        tracing::trace!(%tuple, allowed, "relation checked");
        Ok(allowed)
    }

    /// Whether the request principal administers `target`.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailed` if the store cannot answer.
    pub async fn is_administrator(
        &self,
        ctx: &RequestContext,
        target: &Tag,
    ) -> Result<bool, JimmError> {
        let principal = ctx.principal().to_tag();
        self.check_relation(ctx, &principal, Relation::Administrator, target)
            .await
    }

    /// # Errors
    ///
    /// Returns `Unauthorized` unless the request principal administers
    /// `target`, or `RequestFailed` if the store cannot answer.
    pub async fn ensure_administrator(
        &self,
        ctx: &RequestContext,
        target: &Tag,
    ) -> Result<(), JimmError> {
        if self.is_administrator(ctx, target).await? {
            Ok(())
        } else {
            Err(JimmError::Unauthorized(format!(
                "{} is not an administrator of {target}",
                ctx.principal().tag()
            )))
        }
    }

    /// Verify that the request principal holds every `tag -> relation`
    /// pair in `desired`.
    ///
    /// Pairs already present in `cached` are taken as granted without a
    /// store call. Returns `cached` extended with every newly verified pair,
    /// so the result can be fed back in as the next cache.
    ///
    /// # Errors
    ///
    /// - `InvalidTag` if a key does not parse
    /// - `InvalidEntity` if a relation is unknown or undefined on the tag's kind
    /// - `Unauthorized` on the first pair the principal does not hold
    /// - `RequestFailed` if the store cannot answer
    ///
    /// All errors are prefixed with `jimm.CheckPermission`.
    #[tracing::instrument(skip_all, fields(principal = %ctx.principal().tag(), desired = desired.len()))]
    pub async fn check_permission(
        &self,
        ctx: &RequestContext,
        cached: &BTreeMap<String, String>,
        desired: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, JimmError> {
        let mut granted = cached.clone();
        let principal = ctx.principal().to_tag();

        for (key, relation) in desired {
            if cached.get(key) == Some(relation) {
                continue;
            }

            let target: Tag = key
                .parse()
                .map_err(|e| JimmError::from(e).with_op(ops::CHECK_PERMISSION))?;
            let relation_name = relation;
            let relation: Relation = relation_name.parse().map_err(|_| {
                JimmError::invalid_entity(&target, format!("unknown relation {relation_name:?}"))
                    .with_op(ops::CHECK_PERMISSION)
            })?;
            if !schema::is_defined(target.kind(), relation) {
                return Err(JimmError::invalid_entity(
                    &target,
                    format!("relation {relation} is not defined on {}", target.kind()),
                )
                .with_op(ops::CHECK_PERMISSION));
            }

            let allowed = self
                .check_relation(ctx, &principal, relation, &target)
                .await
                .map_err(|e| e.with_op(ops::CHECK_PERMISSION))?;
            if !allowed {
                return Err(JimmError::Unauthorized(format!(
                    "missing {relation} on {target}"
                ))
                .with_op(ops::CHECK_PERMISSION));
            }

            granted.insert(key.clone(), relation_name.clone());
        }

        Ok(granted)
    }
}

/// Check that `tag` may be granted access to a resource and return the
/// subject form to write.
///
/// Users are written as-is; groups are rewritten to `group-<id>#member` so
/// that the members, not the group, receive the relation.
///
/// # Errors
///
/// Returns `InvalidEntity` for any other kind.
pub fn grantee(tag: Tag) -> Result<Tag, JimmError> {
    match tag.kind() {
        Kind::User => Ok(tag),
        Kind::Group => Ok(tag.into_group_members()),
        kind => Err(JimmError::invalid_entity(
            &tag,
            format!("not a user or group ({kind})"),
        )),
    }
}

/// `subject administrator target`, with group subjects rewritten to their
/// members.
#[must_use]
pub fn administrator_tuple(subject: Tag, target: &impl ToTag) -> Tuple {
    Tuple::new(
        subject.into_group_members(),
        Relation::Administrator,
        target.to_tag(),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::principal::User;
    use in_memory_relation_store_plugin::{Operation, Service};
    use jimm_names::{ServiceAccountTag, UserTag};

    fn tag(s: &str) -> Tag {
        s.parse().unwrap()
    }

    fn tuple(s: &str) -> Tuple {
        s.parse().unwrap()
    }

    fn ctx(user: &str) -> RequestContext {
        RequestContext::new(User::new(UserTag::new(user).unwrap()))
    }

    fn authorizer(lines: &[&str]) -> (Arc<Service>, Authorizer) {
        let store = Arc::new(Service::new());
        let batch: Vec<Tuple> = lines.iter().map(|l| tuple(l)).collect();
        store.add(&batch).unwrap();
        let authz = Authorizer::new(store.clone(), false);
        (store, authz)
    }

    fn perms(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn grantee_rewrites_groups() {
        assert_eq!(grantee(tag("user-bob")).unwrap(), tag("user-bob"));
        assert_eq!(grantee(tag("group-ops")).unwrap(), tag("group-ops#member"));
        assert_eq!(
            grantee(tag("group-ops#member")).unwrap(),
            tag("group-ops#member")
        );
    }

    #[test]
    fn grantee_rejects_resources() {
        for text in ["model-foo", "serviceaccount-other", "controller-c1"] {
            let err = grantee(tag(text)).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidEntity, "{text}");
        }
    }

    #[test]
    fn administrator_tuple_rewrites_group_subjects() {
        let svc = ServiceAccountTag::new("acme-bot").unwrap();
        assert_eq!(
            administrator_tuple(tag("group-ops"), &svc),
            tuple("group-ops#member administrator serviceaccount-acme-bot")
        );
    }

    #[tokio::test]
    async fn is_administrator_follows_group_membership() {
        let (_, authz) = authorizer(&[
            "user-bob member group-ops",
            "group-ops#member administrator serviceaccount-acme",
        ]);
        let svc = tag("serviceaccount-acme");

        assert!(authz.is_administrator(&ctx("bob"), &svc).await.unwrap());
        assert!(!authz.is_administrator(&ctx("carol"), &svc).await.unwrap());
    }

    #[tokio::test]
    async fn ensure_administrator_is_unauthorized_for_others() {
        let (_, authz) = authorizer(&["user-alice administrator serviceaccount-acme"]);
        let svc = tag("serviceaccount-acme");

        authz.ensure_administrator(&ctx("alice"), &svc).await.unwrap();
        let err = authz
            .ensure_administrator(&ctx("bob"), &svc)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn check_permission_extends_cache_with_verified_pairs() {
        let (_, authz) = authorizer(&["user-alice writer model-foo"]);
        let cached = perms(&[("model-bar", "reader")]);
        let desired = perms(&[("model-bar", "reader"), ("model-foo", "reader")]);

        let granted = authz
            .check_permission(&ctx("alice"), &cached, &desired)
            .await
            .unwrap();

        assert_eq!(granted, desired);
    }

    #[tokio::test]
    async fn check_permission_trusts_positive_cache() {
        let (store, authz) = authorizer(&[]);
        store.fail(Operation::Check, "should not be called");
        let cached = perms(&[("model-foo", "reader")]);

        let granted = authz
            .check_permission(&ctx("alice"), &cached, &cached)
            .await
            .unwrap();
        assert_eq!(granted, cached);
    }

    #[tokio::test]
    async fn check_permission_denies_missing_relation() {
        let (_, authz) = authorizer(&["user-alice reader model-foo"]);
        let desired = perms(&[("model-foo", "writer")]);

        let err = authz
            .check_permission(&ctx("alice"), &BTreeMap::new(), &desired)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.op(), Some(ops::CHECK_PERMISSION));
    }

    #[tokio::test]
    async fn check_permission_validates_input() {
        let (_, authz) = authorizer(&[]);
        let alice = ctx("alice");

        let err = authz
            .check_permission(&alice, &BTreeMap::new(), &perms(&[("foo", "reader")]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTag);

        let err = authz
            .check_permission(&alice, &BTreeMap::new(), &perms(&[("model-foo", "owner")]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidEntity);

        let err = authz
            .check_permission(
                &alice,
                &BTreeMap::new(),
                &perms(&[("serviceaccount-acme", "reader")]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidEntity);
    }

    #[tokio::test]
    async fn check_permission_surfaces_store_failure() {
        let (store, authz) = authorizer(&[]);
        store.fail(Operation::Check, "timeout");

        let err = authz
            .check_permission(&ctx("alice"), &BTreeMap::new(), &perms(&[("model-foo", "reader")]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::RequestFailed);
        assert!(err.store_error().is_some_and(|e| e.is_retryable()));
    }
}
