//! Error taxonomy of the conversation engine.

use parley_core::error::DomainError;
use thiserror::Error;

/// Errors raised while driving a conversation.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// A session already exists for the character.
    #[error("character [{0}] already has an active conversation")]
    ConversationAlreadyActive(u32),

    /// No session exists for the character.
    #[error("no active conversation for character [{0}]")]
    NoActiveConversation(u32),

    /// The NPC has no conversation definition.
    #[error("no conversation defined for npc [{0}]")]
    DefinitionNotFound(u32),

    /// A transition named a state the definition does not contain.
    #[error("state [{0}] not found")]
    StateNotFound(String),

    /// Player input arrived while the session sat on a non-interactive state.
    #[error("state [{state}] of type [{state_type}] does not accept player input")]
    UnexpectedStateType {
        state: String,
        state_type: &'static str,
    },

    /// Player input did not resolve to a choice.
    #[error("invalid selection (action [{action}], selection [{selection}])")]
    InvalidSelection { action: u8, selection: i32 },

    #[error("missing {parameter} parameter for {operation} operation")]
    MissingParameter {
        operation: String,
        parameter: &'static str,
    },

    #[error("value [{value}] for parameter [{parameter}] is not a valid integer")]
    InvalidInteger { parameter: String, value: String },

    #[error("{parameter} [{value}] for {operation} operation must be within [{min},{max}]")]
    OutOfRange {
        operation: String,
        parameter: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("unknown operation type: {0}")]
    UnknownOperation(String),

    #[error("unknown local operation type: {0}")]
    UnknownLocalOperation(String),

    #[error("unknown local condition type: {0}")]
    UnknownLocalCondition(String),

    #[error("context key [{0}] not found")]
    ContextKeyNotFound(String),

    #[error("validation service failed: {0}")]
    ValidationService(#[source] DomainError),

    #[error("saga dispatch failed: {0}")]
    SagaDispatch(#[source] DomainError),

    /// Operation execution aborted abnormally.
    #[error("operation execution aborted: {0}")]
    OperationPanicked(String),

    /// Consecutive generic actions kept transitioning without reaching an
    /// interactive state.
    #[error("auto-advance exceeded {hops} consecutive actions at state [{state}]")]
    AutoAdvanceLimit { state: String, hops: usize },

    #[error("invalid conversation definition: {0}")]
    InvalidDefinition(String),

    /// Definition lookup or outbound messaging failed.
    #[error(transparent)]
    Collaborator(#[from] DomainError),
}

impl ConversationError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ConversationAlreadyActive(_) => "conversation_already_active",
            Self::NoActiveConversation(_) => "no_active_conversation",
            Self::DefinitionNotFound(_) => "definition_not_found",
            Self::StateNotFound(_) => "state_not_found",
            Self::UnexpectedStateType { .. } => "unexpected_state_type",
            Self::InvalidSelection { .. } => "invalid_selection",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::InvalidInteger { .. } => "invalid_integer",
            Self::OutOfRange { .. } => "out_of_range",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::UnknownLocalOperation(_) => "unknown_local_operation",
            Self::UnknownLocalCondition(_) => "unknown_local_condition",
            Self::ContextKeyNotFound(_) => "context_key_not_found",
            Self::ValidationService(_) => "validation_service_error",
            Self::SagaDispatch(_) => "saga_dispatch_error",
            Self::OperationPanicked(_) => "operation_aborted",
            Self::AutoAdvanceLimit { .. } => "auto_advance_limit",
            Self::InvalidDefinition(_) => "invalid_definition",
            Self::Collaborator(_) => "collaborator_error",
        }
    }
}
