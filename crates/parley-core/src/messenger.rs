//! Port for outbound NPC dialog commands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Client-side dialog window kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Free-form text with embedded menu entries.
    Simple,
    /// Single "next" button.
    Next,
    /// "Previous" and "next" buttons.
    NextPrevious,
    /// Single "ok" button.
    Ok,
    /// "Yes" and "no" buttons.
    YesNo,
}

impl MessageType {
    /// Wire name of the message type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "SIMPLE",
            Self::Next => "NEXT",
            Self::NextPrevious => "NEXT_PREVIOUS",
            Self::Ok => "OK",
            Self::YesNo => "YES_NO",
        }
    }
}

/// Sends dialog windows to a character's client.
///
/// All commands are one-way notifications.
#[async_trait]
pub trait NpcMessenger: Send + Sync {
    /// Shows `text` from `npc_id` to `character_id` in a window of `message_type`.
    async fn send(
        &self,
        world_id: u8,
        channel_id: u8,
        character_id: u32,
        npc_id: u32,
        message_type: MessageType,
        text: &str,
    ) -> Result<(), DomainError>;

    /// Ends the client-side conversation and re-enables character actions.
    async fn dispose(
        &self,
        world_id: u8,
        channel_id: u8,
        character_id: u32,
    ) -> Result<(), DomainError>;
}
