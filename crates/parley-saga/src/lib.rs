//! Parley Saga — distributed transaction model.
//!
//! A saga is an ordered list of steps handed to an external orchestrator as a
//! single unit. The conversation engine only builds and submits sagas; it
//! never executes or polls them.

pub mod model;
pub mod payload;
pub mod producer;

pub use model::{Saga, SagaType, Status, Step};
pub use payload::{Action, StepPayload};
pub use producer::SagaProducer;
