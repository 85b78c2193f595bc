//! In-memory relation store plugin
//!
//! Reference implementation of
//! [`RelationStoreClient`](relation_store_sdk::RelationStoreClient) used in
//! development and by the test suites. It enforces the same authorization
//! model as a deployed store and supports failure injection through
//! [`Service::fail`].

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::{InMemoryRelationStoreConfig, TupleConfig};
pub use domain::{Operation, Service};
