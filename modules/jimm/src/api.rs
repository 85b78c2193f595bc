//! Public API trait of the authorization core.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use jimm_names::{ServiceAccountTag, Tag};
use relation_store_sdk::RelationStoreClient;

use crate::error::JimmError;
use crate::principal::{RequestContext, User};

/// Operations request handlers call on JIMM.
///
/// Implemented by [`Jimm`](crate::Jimm) and, for handler tests, by
/// `MockJimm` (feature `test-util`):
///
/// ```ignore
/// let jimm: Arc<dyn JimmApi> = Arc::new(Jimm::builder().store(store).build()?);
///
/// let user = jimm.authenticate(token).await?;
/// let ctx = RequestContext::new(user);
/// jimm.add_service_account(&ctx, "acme-bot").await?;
/// ```
#[async_trait]
pub trait JimmApi: Send + Sync {
    /// Resolve a bearer credential to the request principal.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for an unknown credential
    /// - `NotImplemented` if no authentication source is configured
    async fn authenticate(&self, token: &str) -> Result<User, JimmError>;

    /// Claim the service account `client_id` for the request principal.
    ///
    /// # Errors
    ///
    /// `InvalidTag`, `AlreadyOwned` or `RequestFailed`, prefixed with
    /// `jimm.AddServiceAccount`.
    async fn add_service_account(
        &self,
        ctx: &RequestContext,
        client_id: &str,
    ) -> Result<(), JimmError>;

    /// Make each of `entities` (users or groups) an administrator of `svc`.
    /// The caller must first verify that the principal administers `svc`.
    ///
    /// # Errors
    ///
    /// `InvalidTag`, `InvalidEntity` or `RequestFailed`, prefixed with
    /// `jimm.GrantServiceAccountAccess`.
    async fn grant_service_account_access(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
        entities: &[String],
    ) -> Result<(), JimmError>;

    /// Verify `desired` tag-to-relation pairs for the principal, trusting
    /// pairs in `cached`. Returns the extended cache.
    ///
    /// # Errors
    ///
    /// `InvalidTag`, `InvalidEntity`, `Unauthorized` or `RequestFailed`,
    /// prefixed with `jimm.CheckPermission`.
    async fn check_permission(
        &self,
        ctx: &RequestContext,
        cached: &BTreeMap<String, String>,
        desired: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, JimmError>;

    /// Resolve a user-supplied entity reference.
    ///
    /// # Errors
    ///
    /// `InvalidTag`, prefixed with `jimm.ParseTag`.
    async fn parse_tag(&self, ctx: &RequestContext, text: &str) -> Result<Tag, JimmError>;

    /// The relation store behind this instance, if any.
    fn authorization_client(&self) -> Option<Arc<dyn RelationStoreClient>>;
}
