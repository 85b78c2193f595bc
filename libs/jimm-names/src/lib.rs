//! JIMM names
//!
//! Canonical identifiers for the principals and resources the authorization
//! model talks about:
//!
//! - [`Kind`] - closed set of entity kinds
//! - [`Relation`] - closed set of relations known to the relation store schema
//! - [`Tag`] - `(kind, id, relation?)`, parsed from and rendered to
//!   `<kind>-<id>[#<relation>]`
//! - [`UserTag`], [`GroupTag`], [`ServiceAccountTag`] - kind-checked wrappers
//! - [`ToTag`] - projection of domain entities onto their tag
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod error;
pub mod kind;
pub mod relation;
pub mod tag;
pub mod typed;

pub use error::TagError;
pub use kind::Kind;
pub use relation::Relation;
pub use tag::{SERVICE_ACCOUNT_DOMAIN, Tag, ToTag};
pub use typed::{GroupTag, ServiceAccountTag, UserTag};
