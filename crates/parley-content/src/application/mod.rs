//! Document loading and the in-memory definition repository.

pub mod loader;
pub mod repository;
