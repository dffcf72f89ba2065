//! Parley Content — conversation authoring documents.
//!
//! Parses JSON and YAML conversation documents into validated definitions
//! and serves them from an in-memory, tenant-scoped repository.

pub mod application;
pub mod domain;
