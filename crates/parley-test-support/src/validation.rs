//! Test validation services.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use parley_core::error::DomainError;
use parley_core::validation::{ConditionInput, ValidationResult, ValidationService};

/// A validation service that answers from a scripted list of verdicts and
/// records each request. Once the script is exhausted it keeps returning the
/// fallback verdict.
#[derive(Debug)]
pub struct ScriptedValidationService {
    verdicts: Mutex<VecDeque<bool>>,
    fallback: bool,
    requests: Mutex<Vec<(u32, Vec<ConditionInput>)>>,
}

impl ScriptedValidationService {
    /// Always answers `passed`.
    #[must_use]
    pub fn always(passed: bool) -> Self {
        Self::scripted(Vec::new(), passed)
    }

    /// Answers with `verdicts` in order, then `fallback`.
    #[must_use]
    pub fn scripted(verdicts: Vec<bool>, fallback: bool) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<(u32, Vec<ConditionInput>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ValidationService for ScriptedValidationService {
    async fn validate(
        &self,
        character_id: u32,
        conditions: &[ConditionInput],
    ) -> Result<ValidationResult, DomainError> {
        self.requests
            .lock()
            .unwrap()
            .push((character_id, conditions.to_vec()));
        let passed = self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        Ok(ValidationResult { passed })
    }
}

/// A validation service that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingValidationService;

#[async_trait]
impl ValidationService for FailingValidationService {
    async fn validate(
        &self,
        _character_id: u32,
        _conditions: &[ConditionInput],
    ) -> Result<ValidationResult, DomainError> {
        Err(DomainError::Infrastructure("validation service timed out".into()))
    }
}
