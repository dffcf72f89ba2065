//! The in-flight position of one character's conversation.

use std::collections::HashMap;
use std::sync::Arc;

use parley_core::field::Field;

use super::definition::{ConversationDefinition, StateDefinition};
use super::errors::ConversationError;

/// Prefix marking a value as a lookup into the session context.
pub const CONTEXT_PREFIX: &str = "context.";

/// A character's position in a conversation tree plus the context variables
/// accumulated along the way.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub field: Field,
    pub character_id: u32,
    pub npc_id: u32,
    pub current_state: String,
    pub definition: Arc<ConversationDefinition>,
    pub context: HashMap<String, String>,
}

impl ConversationSession {
    /// Creates a session positioned at the definition's start state.
    #[must_use]
    pub fn new(field: Field, character_id: u32, definition: Arc<ConversationDefinition>) -> Self {
        Self {
            field,
            character_id,
            npc_id: definition.npc_id,
            current_state: definition.start_state.clone(),
            definition,
            context: HashMap::new(),
        }
    }

    /// Returns the definition of the current state.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::StateNotFound` if the definition has no
    /// state with the current id.
    pub fn state(&self) -> Result<&StateDefinition, ConversationError> {
        self.definition
            .find_state(&self.current_state)
            .ok_or_else(|| ConversationError::StateNotFound(self.current_state.clone()))
    }

    /// Merges `values` into the context. Incoming keys overwrite existing
    /// ones.
    pub fn merge_context(&mut self, values: &HashMap<String, String>) {
        self.context
            .extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Resolves `raw` either as a `context.<key>` reference or as a literal.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::ContextKeyNotFound` if a referenced key is
    /// absent.
    pub fn resolve<'a>(&'a self, raw: &'a str) -> Result<&'a str, ConversationError> {
        match raw.strip_prefix(CONTEXT_PREFIX) {
            Some(key) => self
                .context
                .get(key)
                .map(String::as_str)
                .ok_or_else(|| ConversationError::ContextKeyNotFound(key.to_owned())),
            None => Ok(raw),
        }
    }

    /// Resolves `raw` and parses the result as an integer.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::ContextKeyNotFound` for a missing reference
    /// and `ConversationError::InvalidInteger` if the resolved value is not an
    /// integer.
    pub fn resolve_int(&self, parameter: &str, raw: &str) -> Result<i64, ConversationError> {
        let value = self.resolve(raw)?;
        value
            .parse::<i64>()
            .map_err(|_| ConversationError::InvalidInteger {
                parameter: parameter.to_owned(),
                value: value.to_owned(),
            })
    }
}
