//! Parley API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_conversation::domain::errors::ConversationError;
use parley_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Conversation documents could not be loaded.
    #[error("definition loading error: {0}")]
    Definitions(#[from] DomainError),

    /// The trace exporter could not be built.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("TENANT_ID header is required")]
    MissingTenant,

    #[error("TENANT_ID header is not a valid UUID: {0}")]
    InvalidTenant(String),
}

fn conversation_status(err: &ConversationError) -> StatusCode {
    match err {
        ConversationError::NoActiveConversation(_) | ConversationError::DefinitionNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ConversationError::ConversationAlreadyActive(_) => StatusCode::CONFLICT,
        ConversationError::UnexpectedStateType { .. }
        | ConversationError::InvalidSelection { .. }
        | ConversationError::StateNotFound(_) => StatusCode::BAD_REQUEST,
        ConversationError::MissingParameter { .. }
        | ConversationError::InvalidInteger { .. }
        | ConversationError::OutOfRange { .. }
        | ConversationError::UnknownOperation(_)
        | ConversationError::UnknownLocalOperation(_)
        | ConversationError::UnknownLocalCondition(_)
        | ConversationError::ContextKeyNotFound(_)
        | ConversationError::AutoAdvanceLimit { .. }
        | ConversationError::InvalidDefinition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ConversationError::ValidationService(_)
        | ConversationError::SagaDispatch(_)
        | ConversationError::Collaborator(_) => StatusCode::BAD_GATEWAY,
        ConversationError::OperationPanicked(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::Conversation(err) => (conversation_status(err), err.code()),
            Self::Domain(DomainError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Domain(DomainError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            Self::Domain(DomainError::Infrastructure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
            Self::MissingTenant => (StatusCode::BAD_REQUEST, "missing_tenant"),
            Self::InvalidTenant(_) => (StatusCode::BAD_REQUEST, "invalid_tenant"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
