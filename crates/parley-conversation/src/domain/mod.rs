//! Domain model of the conversation engine.

pub mod commands;
pub mod definition;
pub mod errors;
pub mod session;
pub mod status;
