//! Command handlers for the conversation engine.
//!
//! Each handler unpacks one inbound command and hands it to the processor.

use parley_core::command::Command;
use tracing::{debug, info};

use super::processor::ConversationProcessor;
use crate::domain::commands::{
    ContinueConversation, ContinueConversationViaEvent, EndConversation, StartConversation,
};
use crate::domain::errors::ConversationError;
use crate::domain::status::{CharacterStatusEvent, StatusReaction};

/// Handles the `StartConversation` command.
///
/// # Errors
///
/// Returns `ConversationError` if the conversation cannot be started or
/// fails while running to its first interactive state.
pub async fn handle_start(
    command: &StartConversation,
    processor: &ConversationProcessor,
) -> Result<(), ConversationError> {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        npc_id = command.npc_id,
        character_id = command.character_id,
        "handling command"
    );
    processor
        .start(
            &command.tenant_id,
            command.field,
            command.npc_id,
            command.character_id,
        )
        .await
}

/// Handles the `ContinueConversation` command.
///
/// # Errors
///
/// Returns `ConversationError` if the character has no conversation, the
/// selection is invalid, or processing the next states fails.
pub async fn handle_continue(
    command: &ContinueConversation,
    processor: &ConversationProcessor,
) -> Result<(), ConversationError> {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        character_id = command.character_id,
        action = command.action,
        selection = command.selection,
        "handling command"
    );
    processor
        .continue_conversation(
            &command.tenant_id,
            command.npc_id,
            command.character_id,
            command.action,
            command.last_message_type,
            command.selection,
        )
        .await
}

/// Handles the `EndConversation` command.
///
/// # Errors
///
/// Returns `ConversationError` if ending fails.
pub async fn handle_end(
    command: &EndConversation,
    processor: &ConversationProcessor,
) -> Result<(), ConversationError> {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        character_id = command.character_id,
        "handling command"
    );
    processor
        .end(&command.tenant_id, command.character_id)
        .await
}

/// Handles the `ContinueConversationViaEvent` command.
///
/// # Errors
///
/// Returns `ConversationError` if the character has no conversation, the
/// reference does not name a state, or processing fails.
pub async fn handle_continue_via_event(
    command: &ContinueConversationViaEvent,
    processor: &ConversationProcessor,
) -> Result<(), ConversationError> {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        character_id = command.character_id,
        reference_id = command.reference_id,
        "handling command"
    );
    processor
        .continue_via_event(
            &command.tenant_id,
            command.character_id,
            command.action,
            command.reference_id,
        )
        .await
}

/// Reacts to a character status event. Presence changes end the
/// conversation; economy events advance it. Events for characters outside a
/// conversation are ignored.
///
/// # Errors
///
/// Returns `ConversationError` if advancing the conversation fails.
pub async fn handle_status_event(
    event: &CharacterStatusEvent,
    processor: &ConversationProcessor,
) -> Result<(), ConversationError> {
    match event.kind.reaction() {
        StatusReaction::End => processor.end(&event.tenant_id, event.character_id).await,
        StatusReaction::ContinueViaEvent {
            action,
            reference_id,
        } => {
            match processor
                .continue_via_event(&event.tenant_id, event.character_id, action, reference_id)
                .await
            {
                Err(ConversationError::NoActiveConversation(character_id)) => {
                    debug!(character_id, "status event for character outside a conversation");
                    Ok(())
                }
                other => other,
            }
        }
    }
}
