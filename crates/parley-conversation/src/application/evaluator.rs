//! Condition evaluation.
//!
//! `local:` conditions are decided in-process; everything else is resolved
//! to an integer operand and delegated to the validation service.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use parley_core::rng::DeterministicRng;
use parley_core::validation::{ConditionInput, ValidationService};
use tracing::debug;

use crate::domain::definition::Condition;
use crate::domain::errors::ConversationError;
use crate::domain::session::ConversationSession;

const LOCAL_PREFIX: &str = "local:";

/// Decides whether a condition holds for the session's character.
#[async_trait]
pub trait ConditionEvaluator: Send + Sync {
    /// Evaluates `condition` against the character owning `session`.
    async fn evaluate(
        &self,
        session: &ConversationSession,
        condition: &Condition,
    ) -> Result<bool, ConversationError>;
}

/// Evaluator backed by the external validation service and an injected RNG.
pub struct DefaultConditionEvaluator {
    validation: Arc<dyn ValidationService>,
    rng: Mutex<Box<dyn DeterministicRng>>,
}

impl DefaultConditionEvaluator {
    /// Creates an evaluator.
    #[must_use]
    pub fn new(validation: Arc<dyn ValidationService>, rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            validation,
            rng: Mutex::new(rng),
        }
    }

    fn evaluate_local(
        &self,
        local_type: &str,
        condition: &Condition,
    ) -> Result<bool, ConversationError> {
        match local_type {
            "random" => {
                let percentage: i64 = condition.value.parse().map_err(|_| {
                    ConversationError::InvalidInteger {
                        parameter: "percentage".to_owned(),
                        value: condition.value.clone(),
                    }
                })?;
                let draw = self
                    .rng
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .next_u32_range(1, 100);
                debug!(draw, percentage, "rolled random condition");
                Ok(i64::from(draw) <= percentage)
            }
            "always" => Ok(condition.value == "true"),
            other => Err(ConversationError::UnknownLocalCondition(other.to_owned())),
        }
    }
}

#[async_trait]
impl ConditionEvaluator for DefaultConditionEvaluator {
    async fn evaluate(
        &self,
        session: &ConversationSession,
        condition: &Condition,
    ) -> Result<bool, ConversationError> {
        debug!(
            condition_type = %condition.condition_type,
            character_id = session.character_id,
            "evaluating condition"
        );

        if let Some(local_type) = condition.condition_type.strip_prefix(LOCAL_PREFIX) {
            return self.evaluate_local(local_type, condition);
        }

        let value = session.resolve_int("value", &condition.value)?;
        let input = ConditionInput {
            condition_type: condition.condition_type.clone(),
            operator: condition.operator.clone(),
            value,
            item_id: condition.item_id.clone(),
        };

        let result = self
            .validation
            .validate(session.character_id, std::slice::from_ref(&input))
            .await
            .map_err(ConversationError::ValidationService)?;

        debug!(
            condition_type = %condition.condition_type,
            operator = %condition.operator,
            value,
            passed = result.passed,
            "condition evaluated"
        );
        Ok(result.passed)
    }
}
