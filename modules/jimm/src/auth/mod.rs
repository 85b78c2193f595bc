//! Authentication source: turns a presented credential into a [`User`].

pub mod config;
pub mod static_authenticator;

use async_trait::async_trait;

use crate::error::JimmError;
use crate::principal::User;

pub use config::{StaticAuthnConfig, TokenMapping};
pub use static_authenticator::StaticAuthenticator;

/// Resolves a bearer credential to the principal it identifies.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`JimmError::Unauthorized`] for an empty or unknown token.
    async fn authenticate(&self, token: &str) -> Result<User, JimmError>;
}
