//! Inbound commands for the conversation engine.

use parley_core::command::Command;
use parley_core::field::Field;
use parley_core::tenant::TenantId;
use uuid::Uuid;

/// Command to start a conversation between a character and an NPC.
#[derive(Debug, Clone)]
pub struct StartConversation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tenant the character belongs to.
    pub tenant_id: TenantId,
    /// Where the character stands.
    pub field: Field,
    /// The NPC being talked to.
    pub npc_id: u32,
    /// The character starting the conversation.
    pub character_id: u32,
}

impl Command for StartConversation {
    fn command_type(&self) -> &'static str {
        "conversation.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command carrying the player's answer to the current dialog window.
#[derive(Debug, Clone)]
pub struct ContinueConversation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tenant the character belongs to.
    pub tenant_id: TenantId,
    /// The NPC being talked to.
    pub npc_id: u32,
    /// The character answering.
    pub character_id: u32,
    /// Client action code (0, 1 or 255).
    pub action: u8,
    /// Type of the window the client answered.
    pub last_message_type: u8,
    /// Menu index picked by the player.
    pub selection: i32,
}

impl Command for ContinueConversation {
    fn command_type(&self) -> &'static str {
        "conversation.continue"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to end a character's conversation.
#[derive(Debug, Clone)]
pub struct EndConversation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tenant the character belongs to.
    pub tenant_id: TenantId,
    /// The character whose conversation ends.
    pub character_id: u32,
}

impl Command for EndConversation {
    fn command_type(&self) -> &'static str {
        "conversation.end"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command advancing a conversation in response to an external event.
#[derive(Debug, Clone)]
pub struct ContinueConversationViaEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tenant the character belongs to.
    pub tenant_id: TenantId,
    /// The character whose conversation advances.
    pub character_id: u32,
    /// Event mode (0 meso gained, 1 generic error, 2 meso-gain error).
    pub action: u8,
    /// Index of the next state; negative ends the conversation.
    pub reference_id: i32,
}

impl Command for ContinueConversationViaEvent {
    fn command_type(&self) -> &'static str {
        "conversation.continue_via_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
