//! Test doubles for code built on [`JimmApi`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use jimm_names::{ServiceAccountTag, Tag};
use relation_store_sdk::RelationStoreClient;

use crate::api::JimmApi;
use crate::error::JimmError;
use crate::principal::{RequestContext, User};

pub type AuthenticateFn = Box<dyn Fn(&str) -> Result<User, JimmError> + Send + Sync>;
pub type AddServiceAccountFn =
    Box<dyn Fn(&RequestContext, &str) -> Result<(), JimmError> + Send + Sync>;
pub type GrantServiceAccountAccessFn = Box<
    dyn Fn(&RequestContext, &ServiceAccountTag, &[String]) -> Result<(), JimmError> + Send + Sync,
>;
pub type CheckPermissionFn = Box<
    dyn Fn(
            &RequestContext,
            &BTreeMap<String, String>,
            &BTreeMap<String, String>,
        ) -> Result<BTreeMap<String, String>, JimmError>
        + Send
        + Sync,
>;
pub type ParseTagFn = Box<dyn Fn(&RequestContext, &str) -> Result<Tag, JimmError> + Send + Sync>;

/// A [`JimmApi`] whose behaviour is supplied per operation.
///
/// Operations left as `None` fail with `NotImplemented`, so a test only
/// wires up what the code under test is expected to call.
///
/// ```ignore
/// let jimm = MockJimm {
///     add_service_account: Some(Box::new(|_, _| Ok(()))),
///     ..MockJimm::default()
/// };
/// ```
#[derive(Default)]
pub struct MockJimm {
    pub authenticate: Option<AuthenticateFn>,
    pub add_service_account: Option<AddServiceAccountFn>,
    pub grant_service_account_access: Option<GrantServiceAccountAccessFn>,
    pub check_permission: Option<CheckPermissionFn>,
    pub parse_tag: Option<ParseTagFn>,
    pub authorization_client: Option<Arc<dyn RelationStoreClient>>,
}

#[async_trait]
impl JimmApi for MockJimm {
    async fn authenticate(&self, token: &str) -> Result<User, JimmError> {
        let f = self
            .authenticate
            .as_ref()
            .ok_or(JimmError::NotImplemented("authenticate"))?;
        f(token)
    }

    async fn add_service_account(
        &self,
        ctx: &RequestContext,
        client_id: &str,
    ) -> Result<(), JimmError> {
        let f = self
            .add_service_account
            .as_ref()
            .ok_or(JimmError::NotImplemented("add_service_account"))?;
        f(ctx, client_id)
    }

    async fn grant_service_account_access(
        &self,
        ctx: &RequestContext,
        svc: &ServiceAccountTag,
        entities: &[String],
    ) -> Result<(), JimmError> {
        let f = self
            .grant_service_account_access
            .as_ref()
            .ok_or(JimmError::NotImplemented("grant_service_account_access"))?;
        f(ctx, svc, entities)
    }

    async fn check_permission(
        &self,
        ctx: &RequestContext,
        cached: &BTreeMap<String, String>,
        desired: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, JimmError> {
        let f = self
            .check_permission
            .as_ref()
            .ok_or(JimmError::NotImplemented("check_permission"))?;
        f(ctx, cached, desired)
    }

    async fn parse_tag(&self, ctx: &RequestContext, text: &str) -> Result<Tag, JimmError> {
        let f = self
            .parse_tag
            .as_ref()
            .ok_or(JimmError::NotImplemented("parse_tag"))?;
        f(ctx, text)
    }

    fn authorization_client(&self) -> Option<Arc<dyn RelationStoreClient>> {
        self.authorization_client.clone()
    }
}
