//! Session registry: the tenant-partitioned, in-memory store of in-flight
//! conversations.
//!
//! A short-held mutex guards the tenant map so distinct tenants never
//! contend; each tenant's character map sits behind its own read/write lock.
//! No method blocks on I/O and no lock is held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use parley_core::tenant::TenantId;

use crate::domain::errors::ConversationError;
use crate::domain::session::ConversationSession;

type TenantSessions = Arc<RwLock<HashMap<u32, ConversationSession>>>;

/// Stores at most one session per (tenant, character).
#[derive(Debug, Default)]
pub struct SessionRegistry {
    tenants: Mutex<HashMap<TenantId, TenantSessions>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn existing_tenant(&self, tenant: &TenantId) -> Option<TenantSessions> {
        self.tenants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tenant)
            .cloned()
    }

    fn tenant(&self, tenant: &TenantId) -> TenantSessions {
        Arc::clone(
            self.tenants
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(*tenant)
                .or_default(),
        )
    }

    /// Returns a snapshot of the character's session.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::NoActiveConversation` if none exists.
    pub fn get(
        &self,
        tenant: &TenantId,
        character_id: u32,
    ) -> Result<ConversationSession, ConversationError> {
        let Some(sessions) = self.existing_tenant(tenant) else {
            return Err(ConversationError::NoActiveConversation(character_id));
        };
        let guard = sessions.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&character_id)
            .cloned()
            .ok_or(ConversationError::NoActiveConversation(character_id))
    }

    /// Stores `session`, replacing any previous one for the character.
    pub fn set(&self, tenant: &TenantId, character_id: u32, session: ConversationSession) {
        self.tenant(tenant)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(character_id, session);
    }

    /// Removes the character's session, returning it if one existed.
    /// Clearing an absent session is a no-op.
    pub fn clear(&self, tenant: &TenantId, character_id: u32) -> Option<ConversationSession> {
        let sessions = self.existing_tenant(tenant)?;
        let mut guard = sessions.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(&character_id)
    }

    /// Number of sessions held for `tenant`.
    #[must_use]
    pub fn len(&self, tenant: &TenantId) -> usize {
        let Some(sessions) = self.existing_tenant(tenant) else {
            return 0;
        };
        let guard = sessions.read().unwrap_or_else(PoisonError::into_inner);
        guard.len()
    }
}
