//! Port to the saga orchestrator.

use async_trait::async_trait;
use parley_core::error::DomainError;

use crate::model::Saga;

/// Submits sagas to the external orchestrator.
///
/// Submission is fire-and-forget: a successful return only means the saga
/// was accepted for execution.
#[async_trait]
pub trait SagaProducer: Send + Sync {
    /// Submits `saga` as a single unit.
    async fn create(&self, saga: &Saga) -> Result<(), DomainError>;
}
