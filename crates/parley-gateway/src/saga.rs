//! Saga orchestrator adapter.

use async_trait::async_trait;
use parley_core::error::DomainError;
use parley_saga::{Saga, SagaProducer};
use reqwest::Client;
use tracing::info;

use crate::endpoint::Endpoint;

const PATH: &str = "/api/sagas";

/// Submits sagas to the orchestrator. Submission is fire-and-forget; the
/// response body is ignored.
#[derive(Debug, Clone)]
pub struct HttpSagaProducer {
    endpoint: Endpoint,
}

impl HttpSagaProducer {
    /// Creates an adapter posting to `{base_url}/api/sagas`.
    #[must_use]
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(http, base_url, PATH),
        }
    }
}

#[async_trait]
impl SagaProducer for HttpSagaProducer {
    async fn create(&self, saga: &Saga) -> Result<(), DomainError> {
        self.endpoint.post(saga).await?;
        info!(
            transaction_id = %saga.transaction_id,
            initiated_by = %saga.initiated_by,
            steps = saga.steps.len(),
            "saga submitted"
        );
        Ok(())
    }
}
