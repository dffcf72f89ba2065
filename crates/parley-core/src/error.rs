//! Domain error types shared by collaborator ports.

use thiserror::Error;

/// Error surfaced by a collaborator port (definition lookup, validation
/// service, saga orchestrator, NPC message channel).
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input was rejected by domain validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/transport error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
