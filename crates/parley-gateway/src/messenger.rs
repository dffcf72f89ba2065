//! NPC conversation command channel adapter.

use async_trait::async_trait;
use parley_core::error::DomainError;
use parley_core::messenger::{MessageType, NpcMessenger};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::endpoint::Endpoint;

const PATH: &str = "/api/npcs/conversations/commands";

/// Speaker placement for engine-driven dialog.
const SPEAKER: &str = "NPC_LEFT";

/// Dialog command shown in a character's client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCommand<'a> {
    pub world_id: u8,
    pub channel_id: u8,
    pub character_id: u32,
    pub npc_id: u32,
    pub speaker: &'static str,
    pub message: &'a str,
    #[serde(rename = "type")]
    pub command_type: &'static str,
    pub body: ConversationBody,
}

/// Window details carried inside a dialog command.
#[derive(Debug, Serialize)]
pub struct ConversationBody {
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

/// Command releasing the client from the conversation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposeCommand {
    pub world_id: u8,
    pub channel_id: u8,
    pub character_id: u32,
    #[serde(rename = "type")]
    pub command_type: &'static str,
}

/// Sends dialog and dispose commands to the channel servers.
#[derive(Debug, Clone)]
pub struct HttpNpcMessenger {
    endpoint: Endpoint,
}

impl HttpNpcMessenger {
    /// Creates an adapter posting to
    /// `{base_url}/api/npcs/conversations/commands`.
    #[must_use]
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(http, base_url, PATH),
        }
    }
}

#[async_trait]
impl NpcMessenger for HttpNpcMessenger {
    async fn send(
        &self,
        world_id: u8,
        channel_id: u8,
        character_id: u32,
        npc_id: u32,
        message_type: MessageType,
        text: &str,
    ) -> Result<(), DomainError> {
        debug!(
            character_id,
            npc_id,
            message_type = message_type.as_str(),
            "sending dialog"
        );
        self.endpoint
            .post(&ConversationCommand {
                world_id,
                channel_id,
                character_id,
                npc_id,
                speaker: SPEAKER,
                message: text,
                command_type: "SIMPLE",
                body: ConversationBody { message_type },
            })
            .await?;
        Ok(())
    }

    async fn dispose(
        &self,
        world_id: u8,
        channel_id: u8,
        character_id: u32,
    ) -> Result<(), DomainError> {
        debug!(character_id, "disposing conversation");
        self.endpoint
            .post(&DisposeCommand {
                world_id,
                channel_id,
                character_id,
                command_type: "DISPOSE",
            })
            .await?;
        Ok(())
    }
}
