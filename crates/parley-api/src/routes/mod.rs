//! Route modules organized by inbound surface.

pub mod characters;
pub mod conversations;
pub mod health;
pub mod npcs;
