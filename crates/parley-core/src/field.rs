//! Location of a character within the game world.

use serde::{Deserialize, Serialize};

/// The world, channel and map a character occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// World identifier.
    pub world_id: u8,
    /// Channel identifier within the world.
    pub channel_id: u8,
    /// Map identifier.
    pub map_id: u32,
}

impl Field {
    /// Creates a new field.
    #[must_use]
    pub const fn new(world_id: u8, channel_id: u8, map_id: u32) -> Self {
        Self {
            world_id,
            channel_id,
            map_id,
        }
    }

    /// Returns the same world and channel with a different map.
    #[must_use]
    pub const fn with_map(self, map_id: u32) -> Self {
        Self { map_id, ..self }
    }
}
