//! Relation store SDK
//!
//! This crate provides the public API of the relation store, the
//! relationship-based (`OpenFGA`-style) authorization backend JIMM keeps
//! its access tuples in:
//!
//! - [`RelationStoreClient`] - client trait implemented by store backends
//! - [`Tuple`], [`TupleFilter`], [`ReadPage`] - request and response models
//! - [`schema`] - the authorization model every store enforces
//! - [`RelationStoreError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use relation_store_sdk::{RelationStoreClient, Tuple, TupleFilter};
//!
//! let tuple: Tuple = "user-alice administrator serviceaccount-acme".parse()?;
//! store.add_relations(&cancel, &[tuple.clone()]).await?;
//! assert!(store.check(&cancel, &tuple, false).await?);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod schema;

pub use api::{RelationStoreClient, read_all_related_objects, with_cancellation};
pub use error::{RelationStoreError, TupleParseError};
pub use models::{MAX_PAGE_SIZE, ReadPage, Tuple, TupleFilter};
