//! Test NPC messengers.

use std::sync::Mutex;

use async_trait::async_trait;
use parley_core::error::DomainError;
use parley_core::messenger::{MessageType, NpcMessenger};

/// A dialog window recorded by `RecordingMessenger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub character_id: u32,
    pub npc_id: u32,
    pub message_type: MessageType,
    pub text: String,
}

/// A messenger that records every dialog and dispose command.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    disposed: Mutex<Vec<u32>>,
}

impl RecordingMessenger {
    /// Create an empty recording messenger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all dialogs that were sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the character ids of every dispose command, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn disposed(&self) -> Vec<u32> {
        self.disposed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NpcMessenger for RecordingMessenger {
    async fn send(
        &self,
        _world_id: u8,
        _channel_id: u8,
        character_id: u32,
        npc_id: u32,
        message_type: MessageType,
        text: &str,
    ) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(SentMessage {
            character_id,
            npc_id,
            message_type,
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn dispose(
        &self,
        _world_id: u8,
        _channel_id: u8,
        character_id: u32,
    ) -> Result<(), DomainError> {
        self.disposed.lock().unwrap().push(character_id);
        Ok(())
    }
}

/// A messenger whose every command fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingMessenger;

#[async_trait]
impl NpcMessenger for FailingMessenger {
    async fn send(
        &self,
        _world_id: u8,
        _channel_id: u8,
        _character_id: u32,
        _npc_id: u32,
        _message_type: MessageType,
        _text: &str,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("channel unavailable".into()))
    }

    async fn dispose(
        &self,
        _world_id: u8,
        _channel_id: u8,
        _character_id: u32,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("channel unavailable".into()))
    }
}
