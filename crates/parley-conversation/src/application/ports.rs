//! Ports owned by the conversation engine.

use async_trait::async_trait;
use parley_core::error::DomainError;
use parley_core::tenant::TenantId;
use uuid::Uuid;

use crate::domain::definition::ConversationDefinition;

/// Looks up conversation definitions.
#[async_trait]
pub trait DefinitionRepository: Send + Sync {
    /// Returns the definition an NPC speaks, or `None` if it has none.
    async fn find_by_npc_id(
        &self,
        tenant: &TenantId,
        npc_id: u32,
    ) -> Result<Option<ConversationDefinition>, DomainError>;
}

/// Manages the definitions a tenant's NPCs speak. Each NPC holds at most one
/// definition.
#[async_trait]
pub trait DefinitionStore: DefinitionRepository {
    /// Every definition held for the tenant, ordered by NPC.
    async fn list(&self, tenant: &TenantId) -> Result<Vec<ConversationDefinition>, DomainError>;

    async fn find_by_id(
        &self,
        tenant: &TenantId,
        id: Uuid,
    ) -> Result<Option<ConversationDefinition>, DomainError>;

    /// Stores a new definition.
    ///
    /// # Errors
    ///
    /// `DomainError::Validation` if the definition is invalid or its NPC
    /// already has one.
    async fn create(
        &self,
        tenant: &TenantId,
        definition: ConversationDefinition,
    ) -> Result<ConversationDefinition, DomainError>;

    /// Replaces the definition stored under `id`, keeping that id.
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` if nothing is stored under `id`, or
    /// `DomainError::Validation` if the replacement is invalid or moves to an
    /// NPC that already has a definition.
    async fn update(
        &self,
        tenant: &TenantId,
        id: Uuid,
        definition: ConversationDefinition,
    ) -> Result<ConversationDefinition, DomainError>;

    /// Removes and returns the definition stored under `id`.
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` if nothing is stored under `id`.
    async fn delete(
        &self,
        tenant: &TenantId,
        id: Uuid,
    ) -> Result<ConversationDefinition, DomainError>;
}
