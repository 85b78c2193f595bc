//! Authenticator backed by a fixed token table from configuration.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use jimm_names::{GroupTag, UserTag};
use secrecy::ExposeSecret;

use super::Authenticator;
use super::config::StaticAuthnConfig;
use crate::error::JimmError;
use crate::principal::User;

/// Authenticator backed by a fixed token table, for development and tests.
///
/// Plays the part of the login layer that extracts the `username` and
/// `groups` attributes from a verified credential.
pub struct StaticAuthenticator {
    users: HashMap<String, User>,
}

impl StaticAuthenticator {
    /// Build the token table, validating every user and group id.
    ///
    /// # Errors
    ///
    /// Fails on an empty or duplicate token or an invalid user or group id.
    pub fn from_config(cfg: &StaticAuthnConfig) -> anyhow::Result<Self> {
        let mut users = HashMap::with_capacity(cfg.tokens.len());

        for (i, mapping) in cfg.tokens.iter().enumerate() {
            let token = mapping.token.expose_secret();
            if token.is_empty() {
                anyhow::bail!("tokens[{i}]: token must not be empty");
            }

            let tag = UserTag::new(mapping.user.as_str())
                .with_context(|| format!("tokens[{i}]: invalid user"))?;
            let groups = mapping
                .groups
                .iter()
                .map(|g| GroupTag::new(g.as_str()))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("tokens[{i}]: invalid group"))?;

            let mut user = User::new(tag).with_groups(groups);
            if let Some(name) = &mapping.display_name {
                user = user.with_display_name(name.as_str());
            }

            if users.insert(token.to_owned(), user).is_some() {
                anyhow::bail!("tokens[{i}]: duplicate token");
            }
        }

        tracing::info!(tokens = users.len(), "static authenticator initialized");
        Ok(Self { users })
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<User, JimmError> {
        if token.is_empty() {
            return Err(JimmError::Unauthorized("no credential presented".to_owned()));
        }
        self.users
            .get(token)
            .cloned()
            .ok_or_else(|| JimmError::Unauthorized("unknown credential".to_owned()))
    }
}
