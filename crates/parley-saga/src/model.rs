//! Saga and step types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{Action, StepPayload};

/// Kind of distributed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaType {
    InventoryTransaction,
}

/// Execution status of a step. Steps built by the engine are always pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Completed,
    Failed,
}

/// One unit of work inside a saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStep", into = "RawStep")]
pub struct Step {
    pub step_id: String,
    pub status: Status,
    pub payload: StepPayload,
}

impl Step {
    /// Creates a pending step.
    #[must_use]
    pub fn pending(step_id: impl Into<String>, payload: StepPayload) -> Self {
        Self {
            step_id: step_id.into(),
            status: Status::Pending,
            payload,
        }
    }

    /// Action tag derived from the payload.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.payload.action()
    }
}

/// Wire shape of a step: the action tag sits beside an untyped payload body.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    step_id: String,
    status: Status,
    action: Action,
    payload: serde_json::Value,
}

impl TryFrom<RawStep> for Step {
    type Error = serde_json::Error;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        Ok(Self {
            step_id: raw.step_id,
            status: raw.status,
            payload: StepPayload::from_value(raw.action, raw.payload)?,
        })
    }
}

impl From<Step> for RawStep {
    fn from(step: Step) -> Self {
        let action = step.payload.action();
        // Payload structs contain only plain fields and always serialize.
        let payload = step
            .payload
            .to_value()
            .unwrap_or(serde_json::Value::Null);
        Self {
            step_id: step.step_id,
            status: step.status,
            action,
            payload,
        }
    }
}

/// An ordered set of steps submitted to the orchestrator as one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saga {
    pub transaction_id: Uuid,
    pub saga_type: SagaType,
    pub initiated_by: String,
    pub steps: Vec<Step>,
}

impl Saga {
    /// Creates an empty saga with a fresh transaction id.
    #[must_use]
    pub fn new(saga_type: SagaType, initiated_by: impl Into<String>) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            saga_type,
            initiated_by: initiated_by.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a step, keeping insertion order.
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}
