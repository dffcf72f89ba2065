//! Character status events that affect an in-flight conversation.

use parley_core::tenant::TenantId;

/// Error code reported when a character cannot afford a meso change.
pub const NOT_ENOUGH_MESO: &str = "NOT_ENOUGH_MESO";

/// Event mode passed to `ContinueViaEvent` when mesos were gained.
pub const MODE_MESO_GAINED: u8 = 0;
/// Event mode for a generic economy error.
pub const MODE_ERROR: u8 = 1;
/// Event mode for a failed meso change.
pub const MODE_MESO_ERROR: u8 = 2;

/// What happened to the character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEventKind {
    Logout,
    ChannelChanged,
    MapChanged,
    MesoChanged { amount: i32 },
    Error { error: String, amount: i32 },
}

/// A status event published for a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterStatusEvent {
    pub tenant_id: TenantId,
    pub character_id: u32,
    pub world_id: u8,
    pub kind: StatusEventKind,
}

/// How the conversation engine responds to a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReaction {
    /// The conversation ends.
    End,
    /// The conversation advances through `ContinueViaEvent`.
    ContinueViaEvent { action: u8, reference_id: i32 },
}

impl StatusEventKind {
    /// Maps the event onto an engine reaction.
    #[must_use]
    pub fn reaction(&self) -> StatusReaction {
        match self {
            Self::Logout | Self::ChannelChanged | Self::MapChanged => StatusReaction::End,
            Self::MesoChanged { amount } => StatusReaction::ContinueViaEvent {
                action: MODE_MESO_GAINED,
                reference_id: *amount,
            },
            Self::Error { error, amount } if error == NOT_ENOUGH_MESO => {
                StatusReaction::ContinueViaEvent {
                    action: MODE_MESO_ERROR,
                    reference_id: *amount,
                }
            }
            Self::Error { .. } => StatusReaction::ContinueViaEvent {
                action: MODE_ERROR,
                reference_id: 0,
            },
        }
    }
}
