//! Application services: the session registry, condition evaluation,
//! operation execution, the processor state machine and the inbound
//! command/query handlers.

pub mod command_handlers;
pub mod evaluator;
pub mod executor;
pub mod locks;
pub mod ports;
pub mod processor;
pub mod query_handlers;
pub mod registry;

#[cfg(test)]
pub(crate) mod fixtures;
