//! In-memory, tenant-scoped definition repository.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use parley_conversation::application::ports::{DefinitionRepository, DefinitionStore};
use parley_conversation::domain::definition::ConversationDefinition;
use parley_core::error::DomainError;
use parley_core::tenant::TenantId;
use tracing::{info, warn};
use uuid::Uuid;

use super::loader;

/// Holds one definition per (tenant, NPC).
#[derive(Debug, Default)]
pub struct InMemoryDefinitionRepository {
    definitions: RwLock<HashMap<TenantId, HashMap<u32, ConversationDefinition>>>,
}

impl InMemoryDefinitionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `definition` under its NPC, returning the definition it
    /// replaced.
    pub fn insert(
        &self,
        tenant: TenantId,
        definition: ConversationDefinition,
    ) -> Option<ConversationDefinition> {
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = definitions
            .entry(tenant)
            .or_default()
            .insert(definition.npc_id, definition);
        if let Some(previous) = &previous {
            warn!(
                npc_id = previous.npc_id,
                "replaced an existing conversation definition"
            );
        }
        previous
    }

    /// Loads every document in `dir` for `tenant`. Returns how many were
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns the loader's error; nothing is stored if any document fails.
    pub fn load_dir(&self, tenant: TenantId, dir: &Path) -> Result<usize, DomainError> {
        let definitions = loader::load_dir(dir)?;
        let count = definitions.len();
        for definition in definitions {
            self.insert(tenant, definition);
        }
        Ok(count)
    }

    /// Number of definitions held for `tenant`.
    #[must_use]
    pub fn len(&self, tenant: &TenantId) -> usize {
        let definitions = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        definitions.get(tenant).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl DefinitionRepository for InMemoryDefinitionRepository {
    async fn find_by_npc_id(
        &self,
        tenant: &TenantId,
        npc_id: u32,
    ) -> Result<Option<ConversationDefinition>, DomainError> {
        let definitions = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(definitions
            .get(tenant)
            .and_then(|by_npc| by_npc.get(&npc_id))
            .cloned())
    }
}

fn validated(definition: &ConversationDefinition) -> Result<(), DomainError> {
    definition
        .validate()
        .map_err(|e| DomainError::Validation(e.to_string()))
}

fn npc_taken(npc_id: u32) -> DomainError {
    DomainError::Validation(format!("npc [{npc_id}] already has a conversation"))
}

fn not_found(id: Uuid) -> DomainError {
    DomainError::NotFound(format!("conversation [{id}]"))
}

#[async_trait]
impl DefinitionStore for InMemoryDefinitionRepository {
    async fn list(&self, tenant: &TenantId) -> Result<Vec<ConversationDefinition>, DomainError> {
        let definitions = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut listed: Vec<ConversationDefinition> = definitions
            .get(tenant)
            .map(|by_npc| by_npc.values().cloned().collect())
            .unwrap_or_default();
        listed.sort_by_key(|definition| definition.npc_id);
        Ok(listed)
    }

    async fn find_by_id(
        &self,
        tenant: &TenantId,
        id: Uuid,
    ) -> Result<Option<ConversationDefinition>, DomainError> {
        let definitions = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(definitions
            .get(tenant)
            .and_then(|by_npc| by_npc.values().find(|definition| definition.id == id))
            .cloned())
    }

    async fn create(
        &self,
        tenant: &TenantId,
        definition: ConversationDefinition,
    ) -> Result<ConversationDefinition, DomainError> {
        validated(&definition)?;
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let by_npc = definitions.entry(*tenant).or_default();
        if by_npc.contains_key(&definition.npc_id) {
            return Err(npc_taken(definition.npc_id));
        }
        if by_npc.values().any(|existing| existing.id == definition.id) {
            return Err(DomainError::Validation(format!(
                "conversation [{}] already exists",
                definition.id
            )));
        }
        info!(id = %definition.id, npc_id = definition.npc_id, "conversation created");
        by_npc.insert(definition.npc_id, definition.clone());
        Ok(definition)
    }

    async fn update(
        &self,
        tenant: &TenantId,
        id: Uuid,
        mut definition: ConversationDefinition,
    ) -> Result<ConversationDefinition, DomainError> {
        definition.id = id;
        validated(&definition)?;
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let by_npc = definitions.get_mut(tenant).ok_or_else(|| not_found(id))?;
        let current_npc = by_npc
            .values()
            .find(|existing| existing.id == id)
            .map(|existing| existing.npc_id)
            .ok_or_else(|| not_found(id))?;
        if current_npc != definition.npc_id && by_npc.contains_key(&definition.npc_id) {
            return Err(npc_taken(definition.npc_id));
        }
        by_npc.remove(&current_npc);
        info!(%id, npc_id = definition.npc_id, "conversation updated");
        by_npc.insert(definition.npc_id, definition.clone());
        Ok(definition)
    }

    async fn delete(
        &self,
        tenant: &TenantId,
        id: Uuid,
    ) -> Result<ConversationDefinition, DomainError> {
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let by_npc = definitions.get_mut(tenant).ok_or_else(|| not_found(id))?;
        let npc_id = by_npc
            .values()
            .find(|existing| existing.id == id)
            .map(|existing| existing.npc_id)
            .ok_or_else(|| not_found(id))?;
        let removed = by_npc.remove(&npc_id).ok_or_else(|| not_found(id))?;
        info!(%id, npc_id, "conversation deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::loader::{DocumentFormat, parse_definition};

    fn notice(npc_id: u32, text: &str) -> ConversationDefinition {
        parse_definition(
            &format!(
                r#"{{"npcId": {npc_id}, "startState": "s", "states": [{{"id": "s", "type": "dialogue", "dialogue": {{"dialogueType": "sendOk", "text": "{text}", "choices": [{{"text": "Ok"}}]}}}}]}}"#
            ),
            DocumentFormat::Json,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_by_npc_id_is_tenant_scoped() {
        // Arrange
        let repository = InMemoryDefinitionRepository::new();
        let tenant_a = TenantId::new(Uuid::new_v4());
        let tenant_b = TenantId::new(Uuid::new_v4());
        repository.insert(tenant_a, notice(1_000, "Hello"));

        // Act
        let found = repository.find_by_npc_id(&tenant_a, 1_000).await.unwrap();
        let other_tenant = repository.find_by_npc_id(&tenant_b, 1_000).await.unwrap();
        let other_npc = repository.find_by_npc_id(&tenant_a, 1_001).await.unwrap();

        // Assert
        assert_eq!(found.map(|d| d.npc_id), Some(1_000));
        assert!(other_tenant.is_none());
        assert!(other_npc.is_none());
    }

    #[test]
    fn test_insert_replaces_definition_for_same_npc() {
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());

        assert!(repository.insert(tenant, notice(1_000, "First")).is_none());
        let replaced = repository.insert(tenant, notice(1_000, "Second"));

        assert!(replaced.is_some());
        assert_eq!(repository.len(&tenant), 1);
    }

    #[test]
    fn test_load_missing_dir_stores_nothing() {
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());

        let result = repository.load_dir(tenant, Path::new("/definitely/not/here"));

        assert!(result.is_err());
        assert_eq!(repository.len(&tenant), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_second_definition_for_npc() {
        // Arrange
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());
        let first = repository
            .create(&tenant, notice(1_000, "First"))
            .await
            .unwrap();

        // Act
        let result = repository.create(&tenant, notice(1_000, "Second")).await;

        // Assert
        match result {
            Err(DomainError::Validation(message)) => assert!(message.contains("1000"), "{message}"),
            other => panic!("expected Validation, got {other:?}"),
        }
        let stored = repository.find_by_id(&tenant, first.id).await.unwrap();
        assert_eq!(stored, Some(first));
    }

    #[tokio::test]
    async fn test_create_validates_definition() {
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());
        let mut broken = notice(1_000, "Hello");
        broken.start_state = "missing".to_owned();

        let result = repository.create(&tenant, broken).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(repository.len(&tenant), 0);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_npc() {
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());
        repository.insert(tenant, notice(3_000, "C"));
        repository.insert(tenant, notice(1_000, "A"));
        repository.insert(TenantId::new(Uuid::new_v4()), notice(2_000, "B"));

        let listed = repository.list(&tenant).await.unwrap();

        let npc_ids: Vec<u32> = listed.iter().map(|d| d.npc_id).collect();
        assert_eq!(npc_ids, vec![1_000, 3_000]);
    }

    #[tokio::test]
    async fn test_update_can_move_definition_to_another_npc() {
        // Arrange
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());
        let created = repository
            .create(&tenant, notice(1_000, "Hello"))
            .await
            .unwrap();

        // Act
        let updated = repository
            .update(&tenant, created.id, notice(1_001, "Moved"))
            .await
            .unwrap();

        // Assert
        assert_eq!(updated.id, created.id);
        assert!(repository.find_by_npc_id(&tenant, 1_000).await.unwrap().is_none());
        let moved = repository.find_by_npc_id(&tenant, 1_001).await.unwrap();
        assert_eq!(moved.map(|d| d.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_update_onto_occupied_npc_is_rejected() {
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());
        let first = repository.create(&tenant, notice(1_000, "A")).await.unwrap();
        repository.create(&tenant, notice(1_001, "B")).await.unwrap();

        let result = repository.update(&tenant, first.id, notice(1_001, "C")).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(repository.len(&tenant), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id_are_not_found() {
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());
        repository.insert(tenant, notice(1_000, "A"));

        let updated = repository
            .update(&tenant, Uuid::new_v4(), notice(1_000, "B"))
            .await;
        let deleted = repository.delete(&tenant, Uuid::new_v4()).await;

        assert!(matches!(updated, Err(DomainError::NotFound(_))));
        assert!(matches!(deleted, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_definition() {
        let repository = InMemoryDefinitionRepository::new();
        let tenant = TenantId::new(Uuid::new_v4());
        let created = repository.create(&tenant, notice(1_000, "A")).await.unwrap();

        let removed = repository.delete(&tenant, created.id).await.unwrap();

        assert_eq!(removed.npc_id, 1_000);
        assert!(repository.find_by_npc_id(&tenant, 1_000).await.unwrap().is_none());
    }
}
