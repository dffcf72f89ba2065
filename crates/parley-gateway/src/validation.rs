//! Validation service adapter.

use async_trait::async_trait;
use parley_core::error::DomainError;
use parley_core::validation::{ConditionInput, ValidationResult, ValidationService};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::endpoint::Endpoint;

const PATH: &str = "/api/validations";

/// Body of a validation request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest<'a> {
    pub character_id: u32,
    pub conditions: &'a [ConditionInput],
}

/// Validates conditions through the query aggregator's validation endpoint.
#[derive(Debug, Clone)]
pub struct HttpValidationService {
    endpoint: Endpoint,
}

impl HttpValidationService {
    /// Creates an adapter posting to `{base_url}/api/validations`.
    #[must_use]
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(http, base_url, PATH),
        }
    }
}

#[async_trait]
impl ValidationService for HttpValidationService {
    async fn validate(
        &self,
        character_id: u32,
        conditions: &[ConditionInput],
    ) -> Result<ValidationResult, DomainError> {
        debug!(
            url = self.endpoint.url(),
            character_id,
            count = conditions.len(),
            "validating conditions"
        );
        let response = self
            .endpoint
            .post(&ValidationRequest {
                character_id,
                conditions,
            })
            .await?;
        response.json::<ValidationResult>().await.map_err(|e| {
            DomainError::Infrastructure(format!("malformed validation response: {e}"))
        })
    }
}
