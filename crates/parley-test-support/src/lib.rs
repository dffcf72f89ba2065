//! Shared test mocks and utilities for the Parley NPC conversation engine.

mod clock;
mod messenger;
mod rng;
mod saga;
mod validation;

pub use clock::FixedClock;
pub use messenger::{FailingMessenger, RecordingMessenger, SentMessage};
pub use rng::{MockRng, SequenceRng};
pub use saga::{FailingSagaProducer, RecordingSagaProducer};
pub use validation::{FailingValidationService, ScriptedValidationService};
