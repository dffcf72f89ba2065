//! Test saga producers.

use std::sync::Mutex;

use async_trait::async_trait;
use parley_core::error::DomainError;
use parley_saga::{Saga, SagaProducer};

/// A saga producer that records every submitted saga and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingSagaProducer {
    created: Mutex<Vec<Saga>>,
}

impl RecordingSagaProducer {
    /// Create an empty recording producer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all sagas that were submitted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created_sagas(&self) -> Vec<Saga> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl SagaProducer for RecordingSagaProducer {
    async fn create(&self, saga: &Saga) -> Result<(), DomainError> {
        self.created.lock().unwrap().push(saga.clone());
        Ok(())
    }
}

/// A saga producer that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingSagaProducer;

#[async_trait]
impl SagaProducer for FailingSagaProducer {
    async fn create(&self, _saga: &Saga) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("broker unavailable".into()))
    }
}
