//! Parley API — HTTP surface of the NPC conversation engine.
//!
//! Inbound conversation commands and character status events arrive as JSON
//! requests; queries expose in-flight sessions and loaded definitions.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod tenant;
