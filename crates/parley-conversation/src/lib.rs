//! Parley — NPC conversation execution engine.
//!
//! Walks a character through a declarative conversation tree: keeps exactly
//! one in-flight session per character, evaluates branch conditions against
//! external character state, and dispatches side effects either in-process
//! or as a single saga.

pub mod application;
pub mod domain;
