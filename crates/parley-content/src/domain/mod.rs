//! Authoring document model.

pub mod document;
