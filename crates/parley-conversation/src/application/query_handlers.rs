//! Query handlers for the conversation engine.
//!
//! Read-only views over in-flight sessions and loaded definitions.

use std::collections::BTreeMap;

use parley_core::tenant::TenantId;
use serde::Serialize;
use uuid::Uuid;

use super::ports::DefinitionRepository;
use super::registry::SessionRegistry;
use crate::domain::definition::ConversationDefinition;
use crate::domain::errors::ConversationError;

/// Read-only view of a character's conversation session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The character in the conversation.
    pub character_id: u32,
    /// The NPC being talked to.
    pub npc_id: u32,
    /// The state the conversation is waiting in.
    pub current_state: String,
    pub world_id: u8,
    pub channel_id: u8,
    pub map_id: u32,
    /// Values accumulated from selected choices.
    pub context: BTreeMap<String, String>,
}

/// Read-only summary of an NPC's conversation definition.
#[derive(Debug, Serialize)]
pub struct DefinitionSummaryView {
    pub id: Uuid,
    pub npc_id: u32,
    pub start_state: String,
    /// State ids in definition order.
    pub state_ids: Vec<String>,
}

impl From<ConversationDefinition> for DefinitionSummaryView {
    fn from(definition: ConversationDefinition) -> Self {
        Self {
            id: definition.id,
            npc_id: definition.npc_id,
            start_state: definition.start_state,
            state_ids: definition.states.into_iter().map(|state| state.id).collect(),
        }
    }
}

/// Retrieves the character's in-flight session.
///
/// # Errors
///
/// Returns `ConversationError::NoActiveConversation` if the character is not
/// in a conversation.
pub fn get_session(
    registry: &SessionRegistry,
    tenant: &TenantId,
    character_id: u32,
) -> Result<SessionView, ConversationError> {
    let session = registry.get(tenant, character_id)?;
    Ok(SessionView {
        character_id: session.character_id,
        npc_id: session.npc_id,
        current_state: session.current_state,
        world_id: session.field.world_id,
        channel_id: session.field.channel_id,
        map_id: session.field.map_id,
        context: session.context.into_iter().collect(),
    })
}

/// Retrieves a summary of the NPC's conversation definition.
///
/// # Errors
///
/// Returns `ConversationError::DefinitionNotFound` if the NPC has no
/// conversation, or `ConversationError::Collaborator` if the lookup fails.
pub async fn get_definition_summary<R>(
    definitions: &R,
    tenant: &TenantId,
    npc_id: u32,
) -> Result<DefinitionSummaryView, ConversationError>
where
    R: DefinitionRepository + ?Sized,
{
    let definition = definitions
        .find_by_npc_id(tenant, npc_id)
        .await?
        .ok_or(ConversationError::DefinitionNotFound(npc_id))?;
    Ok(definition.into())
}
