//! The production [`JimmApi`] implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use jimm_names::{ServiceAccountTag, Tag};
use relation_store_sdk::RelationStoreClient;

use crate::api::JimmApi;
use crate::auth::{Authenticator, StaticAuthenticator};
use crate::config::JimmConfig;
use crate::domain::{
    Authorizer, CanonicalTagResolver, ServiceAccountState, ServiceAccounts, TagResolver,
};
use crate::error::{JimmError, ops};
use crate::principal::{RequestContext, User};

/// Authorization core with its collaborators injected.
///
/// Holds no mutable state; share it between request tasks behind an `Arc`.
pub struct Jimm {
    authorizer: Authorizer,
    service_accounts: ServiceAccounts,
    resolver: Arc<dyn TagResolver>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl Jimm {
    #[must_use]
    pub fn builder() -> JimmBuilder {
        JimmBuilder::default()
    }

    /// Build from configuration, with a [`StaticAuthenticator`] over
    /// `cfg.authn` and the canonical tag resolver.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn from_config(
        cfg: &JimmConfig,
        store: Arc<dyn RelationStoreClient>,
    ) -> anyhow::Result<Self> {
        cfg.validate()?;
        let authenticator = StaticAuthenticator::from_config(&cfg.authn)?;

        let jimm = Self::builder()
            .config(cfg)
            .store(store)
            .authenticator(Arc::new(authenticator))
            .build()?;
        Ok(jimm)
    }

    #[must_use]
    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// # Errors
    ///
    /// Returns `Unauthorized` unless the request principal administers
    /// `svc`, or `RequestFailed` if the store cannot answer.
    pub async fn ensure_service_account_admin(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
    ) -> Result<(), JimmError> {
        self.authorizer.ensure_administrator(ctx, svc.as_tag()).await
    }

    /// # Errors
    ///
    /// Returns `RequestFailed` if the store fails.
    pub async fn service_account_state(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
    ) -> Result<ServiceAccountState, JimmError> {
        self.service_accounts.service_account_state(ctx, svc).await
    }
}

#[async_trait]
impl JimmApi for Jimm {
    async fn authenticate(&self, token: &str) -> Result<User, JimmError> {
        let Some(authenticator) = &self.authenticator else {
            return Err(JimmError::NotImplemented("authentication"));
        };
        let user = authenticator.authenticate(token).await?;
        tracing::debug!(user = %user.tag(), "request authenticated");
        Ok(user)
    }

    async fn add_service_account(
        &self,
        ctx: &RequestContext,
        client_id: &str,
    ) -> Result<(), JimmError> {
        self.service_accounts
            .add_service_account(ctx, client_id)
            .await
    }

    async fn grant_service_account_access(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
        entities: &[String],
    ) -> Result<(), JimmError> {
        self.service_accounts
            .grant_service_account_access(ctx, svc, entities)
            .await
    }

    async fn check_permission(
        &self,
        ctx: &RequestContext,
        cached: &BTreeMap<String, String>,
        desired: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, JimmError> {
        self.authorizer.check_permission(ctx, cached, desired).await
    }

    async fn parse_tag(&self, ctx: &RequestContext, text: &str) -> Result<Tag, JimmError> {
        self.resolver
            .resolve(ctx, text)
            .await
            .map_err(|e| e.with_op(ops::PARSE_TAG))
    }

    fn authorization_client(&self) -> Option<Arc<dyn RelationStoreClient>> {
        Some(Arc::clone(self.authorizer.store()))
    }
}

/// Assembles a [`Jimm`]. Only the relation store is mandatory.
pub struct JimmBuilder {
    store: Option<Arc<dyn RelationStoreClient>>,
    resolver: Option<Arc<dyn TagResolver>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    claim_read_limit: u32,
    check_trace: bool,
}

impl Default for JimmBuilder {
    fn default() -> Self {
        let cfg = JimmConfig::default();
        Self {
            store: None,
            resolver: None,
            authenticator: None,
            claim_read_limit: cfg.claim_read_limit,
            check_trace: cfg.check_trace,
        }
    }
}

impl JimmBuilder {
    #[must_use]
    pub fn store(mut self, store: Arc<dyn RelationStoreClient>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn tag_resolver(mut self, resolver: Arc<dyn TagResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Take tuning knobs from `cfg`. Does not build an authenticator; see
    /// [`Jimm::from_config`].
    #[must_use]
    pub fn config(mut self, cfg: &JimmConfig) -> Self {
        self.claim_read_limit = cfg.claim_read_limit;
        self.check_trace = cfg.check_trace;
        self
    }

    /// # Errors
    ///
    /// Returns `NotImplemented` if no relation store was given.
    pub fn build(self) -> Result<Jimm, JimmError> {
        let store = self
            .store
            .ok_or(JimmError::NotImplemented("relation store"))?;
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(CanonicalTagResolver));
        let authorizer = Authorizer::new(store, self.check_trace);

        Ok(Jimm {
            service_accounts: ServiceAccounts::new(
                authorizer.clone(),
                Arc::clone(&resolver),
                self.claim_read_limit,
            ),
            authorizer,
            resolver,
            authenticator: self.authenticator,
        })
    }
}
