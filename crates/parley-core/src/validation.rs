//! Port to the external character-state validation service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A single condition submitted for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionInput {
    /// Condition type, e.g. `jobId`, `meso`, `item`.
    #[serde(rename = "type")]
    pub condition_type: String,
    /// Comparison operator, e.g. `=`, `>=`.
    pub operator: String,
    /// Resolved integer operand.
    pub value: i64,
    /// Item key for item-based conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

/// Verdict returned by the validation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether every submitted condition held.
    pub passed: bool,
}

/// Validates conditions against a character's current state.
#[async_trait]
pub trait ValidationService: Send + Sync {
    /// Validates `conditions` for `character_id`.
    async fn validate(
        &self,
        character_id: u32,
        conditions: &[ConditionInput],
    ) -> Result<ValidationResult, DomainError>;
}
