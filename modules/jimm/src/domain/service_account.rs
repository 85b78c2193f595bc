//! Service-account ownership: claim and delegated administration.

use std::sync::Arc;

use jimm_names::{Relation, ServiceAccountTag, Tag, ToTag};
use relation_store_sdk::{MAX_PAGE_SIZE, TupleFilter, read_all_related_objects};

use super::authorizer::{Authorizer, administrator_tuple, grantee};
use super::tag_resolver::TagResolver;
use crate::error::{JimmError, ops};
use crate::principal::RequestContext;

/// Who administers a service account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAccountState {
    /// Nobody; the next claim succeeds.
    Unclaimed,
    /// A single administrator, normally whoever claimed it.
    Claimed(Tag),
    /// Two or more administrators, sorted.
    Shared(Vec<Tag>),
}

/// Service-account lifecycle operations.
pub struct ServiceAccounts {
    authorizer: Authorizer,
    resolver: Arc<dyn TagResolver>,
    claim_read_limit: u32,
}

impl ServiceAccounts {
    #[must_use]
    pub fn new(
        authorizer: Authorizer,
        resolver: Arc<dyn TagResolver>,
        claim_read_limit: u32,
    ) -> Self {
        Self {
            authorizer,
            resolver,
            claim_read_limit,
        }
    }

    /// Make the request principal the administrator of the service account
    /// `client_id`, provided nobody administers it yet.
    ///
    /// Claiming an account the principal already administers succeeds
    /// without writing.
    ///
    /// The ownership probe and the write are separate store requests, so two
    /// principals claiming the same unowned account at the same time may
    /// both succeed and end up sharing it. Callers that need a single owner
    /// must serialize claims themselves.
    ///
    /// # Errors
    ///
    /// - `InvalidTag` if `client_id` is not a valid client id
    /// - `AlreadyOwned` if someone else administers the account
    /// - `RequestFailed` if the store fails; a failed write is indeterminate
    ///
    /// All errors are prefixed with `jimm.AddServiceAccount`.
    #[tracing::instrument(skip_all, fields(principal = %ctx.principal().tag(), client_id = %client_id))]
    pub async fn add_service_account(
        &self,
        ctx: &RequestContext,
        client_id: &str,
    ) -> Result<(), JimmError> {
        self.claim(ctx, client_id)
            .await
            .map_err(|e| e.with_op(ops::ADD_SERVICE_ACCOUNT))
    }

    async fn claim(&self, ctx: &RequestContext, client_id: &str) -> Result<(), JimmError> {
        let svc = ServiceAccountTag::new(client_id)?;
        let store = self.authorizer.store();

        if self.authorizer.is_administrator(ctx, svc.as_tag()).await? {
            tracing::debug!(%svc, "service account already administered by principal");
            return Ok(());
        }

        let filter = TupleFilter::new(Relation::Administrator, svc.to_tag());
        let page = store
            .read_related_objects(ctx.cancel(), &filter, self.claim_read_limit, None)
            .await?;
        if !page.tuples.is_empty() {
            return Err(JimmError::AlreadyOwned(svc.to_string()));
        }

        let tuple = administrator_tuple(ctx.principal().to_tag(), &svc);
        store.add_relations(ctx.cancel(), &[tuple]).await?;
        tracing::info!(%svc, "service account claimed");
        Ok(())
    }

    /// Make every entity in `entities` an administrator of `svc`.
    ///
    /// Entities must be users or groups; groups are granted through their
    /// members. Every entity is validated before anything is written, and
    /// all tuples go to the store in one batch.
    ///
    /// The caller must already have verified that the principal
    /// administers `svc`.
    ///
    /// # Errors
    ///
    /// - `InvalidTag` if an entity does not resolve
    /// - `InvalidEntity` if an entity is neither a user nor a group
    /// - `RequestFailed` if the write fails
    ///
    /// All errors are prefixed with `jimm.GrantServiceAccountAccess`.
    #[tracing::instrument(skip_all, fields(principal = %ctx.principal().tag(), %svc, entities = entities.len()))]
    pub async fn grant_service_account_access(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
        entities: &[String],
    ) -> Result<(), JimmError> {
        self.grant(ctx, svc, entities)
            .await
            .map_err(|e| e.with_op(ops::GRANT_SERVICE_ACCOUNT_ACCESS))
    }

    async fn grant(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
        entities: &[String],
    ) -> Result<(), JimmError> {
        let mut tuples = Vec::with_capacity(entities.len());
        for entity in entities {
            let tag = grantee(self.resolver.resolve(ctx, entity).await?)?;
            tuples.push(administrator_tuple(tag, svc));
        }

        if let Err(err) = self
            .authorizer
            .store()
            .add_relations(ctx.cancel(), &tuples)
            .await
        {
            tracing::error!("add-relation-error" = %err, "failed to add tuple(s)");
            return Err(err.into());
        }
        Ok(())
    }

    /// Current administrators of `svc`, read in full.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailed` if the store fails.
    pub async fn service_account_state(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
    ) -> Result<ServiceAccountState, JimmError> {
        let filter = TupleFilter::new(Relation::Administrator, svc.to_tag());
        let tuples = read_all_related_objects(
            self.authorizer.store().as_ref(),
            ctx.cancel(),
            &filter,
            MAX_PAGE_SIZE,
        )
        .await?;

        let mut admins: Vec<Tag> = tuples.into_iter().map(|t| t.object).collect();
        admins.sort();
        admins.dedup();

        Ok(match admins.len() {
            0 => ServiceAccountState::Unclaimed,
            1 => ServiceAccountState::Claimed(admins.remove(0)),
            _ => ServiceAccountState::Shared(admins),
        })
    }
}
