//! Configuration for the authorization core.

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use relation_store_sdk::MAX_PAGE_SIZE;
use serde::Deserialize;

use crate::auth::StaticAuthnConfig;

/// Prefix of environment variables overriding file settings,
/// e.g. `JIMM_CLAIM_READ_LIMIT=1`.
pub const ENV_PREFIX: &str = "JIMM_";

/// Core configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JimmConfig {
    /// Page size of the ownership probe made when claiming a service
    /// account. Only existence matters, so any value in `1..=100` gives the
    /// same outcome.
    pub claim_read_limit: u32,

    /// Ask the relation store to log how each check was resolved.
    pub check_trace: bool,

    /// Static authentication source.
    pub authn: StaticAuthnConfig,
}

impl Default for JimmConfig {
    fn default() -> Self {
        Self {
            claim_read_limit: 10,
            check_trace: false,
            authn: StaticAuthnConfig::default(),
        }
    }
}

impl JimmConfig {
    /// Layer defaults, the YAML file at `path` (if given and present) and
    /// `JIMM_`-prefixed environment variables, in that order.
    ///
    /// # Errors
    ///
    /// Fails if a source cannot be parsed or the result is invalid.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::from_figment(&figment)
    }

    /// Extract and validate a configuration from an assembled figment.
    ///
    /// # Errors
    ///
    /// Fails if extraction fails or the result is invalid.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        let cfg: Self = figment
            .extract()
            .context("failed to load jimm configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Fails if `claim_read_limit` is outside `1..=100`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.claim_read_limit == 0 || self.claim_read_limit > MAX_PAGE_SIZE {
            anyhow::bail!(
                "claim_read_limit must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.claim_read_limit
            );
        }
        Ok(())
    }
}
