//! Domain layer for the in-memory relation store plugin.

pub mod client;
pub mod service;

pub use service::{Operation, Service};
