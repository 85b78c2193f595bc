//! JIMM authorization core
//!
//! Maps users, groups and service accounts onto a relationship graph kept
//! in a relation store, answers permission questions against it, and runs
//! the service-account ownership lifecycle:
//!
//! - [`JimmApi`] - operations exposed to request handlers
//! - [`Jimm`] - implementation with injected collaborators
//! - [`domain::Authorizer`] - permission checks and tuple building
//! - [`domain::ServiceAccounts`] - claim, grant and ownership state
//! - [`auth`] - authentication source
//! - [`JimmError`], [`ErrorCode`] - error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use jimm::{Jimm, JimmApi, RequestContext};
//!
//! let jimm = Jimm::builder().store(store).build()?;
//! let ctx = RequestContext::new(user);
//!
//! jimm.add_service_account(&ctx, "acme-bot").await?;
//! jimm.ensure_service_account_admin(&ctx, &svc).await?;
//! jimm.grant_service_account_access(&ctx, &svc, &["group-ops".into()]).await?;
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod principal;
pub mod service;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use api::JimmApi;
pub use config::JimmConfig;
pub use domain::{ServiceAccountState, TagResolver};
pub use error::{ErrorCode, JimmError};
pub use principal::{RequestContext, User};
pub use service::{Jimm, JimmBuilder};
