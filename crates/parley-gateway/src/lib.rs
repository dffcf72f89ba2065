//! Parley Gateway — HTTP adapters for the engine's external collaborators.
//!
//! Each adapter implements one outbound port over a shared
//! `reqwest::Client`. Non-success responses surface as
//! `DomainError::Infrastructure`.

mod endpoint;
pub mod messenger;
pub mod saga;
pub mod validation;

#[cfg(test)]
mod stub;

pub use messenger::HttpNpcMessenger;
pub use saga::HttpSagaProducer;
pub use validation::HttpValidationService;
