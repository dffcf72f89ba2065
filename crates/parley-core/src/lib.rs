//! Parley Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the conversation
//! engine and its adapters depend on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod field;
pub mod messenger;
pub mod rng;
pub mod tenant;
pub mod validation;
