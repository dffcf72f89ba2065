//! The conversation state machine.
//!
//! The processor starts, continues and ends conversations. It interprets the
//! session's current state, drives the evaluator and executor, and writes
//! the new position back to the registry. Any failure while interpreting
//! states clears the session so a character is never left mid-conversation.

use std::sync::Arc;

use parley_core::field::Field;
use parley_core::messenger::{MessageType, NpcMessenger};
use parley_core::tenant::TenantId;
use tracing::{debug, error, info, instrument, warn};

use super::evaluator::ConditionEvaluator;
use super::executor::OperationExecutor;
use super::locks::CharacterLocks;
use super::ports::DefinitionRepository;
use super::registry::SessionRegistry;
use crate::domain::definition::{GenericAction, StateDefinition, StateKind};
use crate::domain::errors::ConversationError;
use crate::domain::session::ConversationSession;

/// Chained generic actions allowed per command before the conversation is
/// treated as a runaway cycle.
pub const DEFAULT_MAX_AUTO_ADVANCE: usize = 1_000;

/// Drives conversations for every tenant sharing the process.
pub struct ConversationProcessor {
    registry: Arc<SessionRegistry>,
    definitions: Arc<dyn DefinitionRepository>,
    evaluator: Arc<dyn ConditionEvaluator>,
    executor: Arc<dyn OperationExecutor>,
    messenger: Arc<dyn NpcMessenger>,
    locks: CharacterLocks,
    max_auto_advance: usize,
}

impl ConversationProcessor {
    /// Creates a processor over the given registry and collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        definitions: Arc<dyn DefinitionRepository>,
        evaluator: Arc<dyn ConditionEvaluator>,
        executor: Arc<dyn OperationExecutor>,
        messenger: Arc<dyn NpcMessenger>,
    ) -> Self {
        Self {
            registry,
            definitions,
            evaluator,
            executor,
            messenger,
            locks: CharacterLocks::new(),
            max_auto_advance: DEFAULT_MAX_AUTO_ADVANCE,
        }
    }

    /// Caps how many generic actions one command may chain through.
    #[must_use]
    pub fn with_max_auto_advance(mut self, hops: usize) -> Self {
        self.max_auto_advance = hops;
        self
    }

    /// The registry holding in-flight sessions.
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Starts the NPC's conversation for a character and runs it up to the
    /// first interactive state.
    ///
    /// # Errors
    ///
    /// Returns `ConversationAlreadyActive` if the character is already in a
    /// conversation (the existing session is left untouched),
    /// `DefinitionNotFound` if the NPC has no conversation, or any error
    /// raised while interpreting states (the session is then cleared).
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn start(
        &self,
        tenant: &TenantId,
        field: Field,
        npc_id: u32,
        character_id: u32,
    ) -> Result<(), ConversationError> {
        let _guard = self.locks.lock(*tenant, character_id).await;

        if let Ok(existing) = self.registry.get(tenant, character_id) {
            debug!(
                existing_npc_id = existing.npc_id,
                "character already in a conversation"
            );
            return Err(ConversationError::ConversationAlreadyActive(character_id));
        }

        let definition = self
            .definitions
            .find_by_npc_id(tenant, npc_id)
            .await?
            .ok_or(ConversationError::DefinitionNotFound(npc_id))?;

        info!(map_id = field.map_id, "starting conversation");
        let session = ConversationSession::new(field, character_id, Arc::new(definition));
        self.registry.set(tenant, character_id, session);
        self.advance(tenant, character_id).await
    }

    /// Applies the player's answer to the current dialogue or list selection.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveConversation` without a session, `UnexpectedStateType`
    /// if the current state does not take input, `InvalidSelection` if the
    /// input resolves to no choice, or any error raised while interpreting
    /// the following states.
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn continue_conversation(
        &self,
        tenant: &TenantId,
        npc_id: u32,
        character_id: u32,
        action: u8,
        last_message_type: u8,
        selection: i32,
    ) -> Result<(), ConversationError> {
        let _guard = self.locks.lock(*tenant, character_id).await;

        let mut session = self.registry.get(tenant, character_id)?;
        let state = session.state()?;
        let choice = match &state.kind {
            StateKind::Dialogue(dialogue) => dialogue
                .choice_for(action, selection)
                .ok_or(ConversationError::InvalidSelection { action, selection })?,
            StateKind::ListSelection(list) => list.choice_for(action, selection)?,
            StateKind::GenericAction(_) | StateKind::CraftAction(_) => {
                return Err(ConversationError::UnexpectedStateType {
                    state: state.id.clone(),
                    state_type: state.type_name(),
                });
            }
        };
        debug!(choice = %choice.text, "resolved player choice");

        let Some(next_state) = choice.next_state.clone() else {
            self.finish(tenant, character_id).await;
            return Ok(());
        };
        let context = choice.context.clone();

        session.merge_context(&context);
        session.current_state = next_state;
        self.registry.set(tenant, character_id, session);
        self.advance(tenant, character_id).await
    }

    /// Advances the conversation in response to an external event, jumping to
    /// the state at position `reference_id` in the definition. A negative
    /// reference ends the conversation.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveConversation` without a session, `StateNotFound` if
    /// the reference is past the last state, or any error raised while
    /// interpreting the following states.
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn continue_via_event(
        &self,
        tenant: &TenantId,
        character_id: u32,
        action: u8,
        reference_id: i32,
    ) -> Result<(), ConversationError> {
        let _guard = self.locks.lock(*tenant, character_id).await;

        let mut session = self.registry.get(tenant, character_id)?;
        let Ok(index) = usize::try_from(reference_id) else {
            self.finish(tenant, character_id).await;
            return Ok(());
        };
        let next_state = session
            .definition
            .states
            .get(index)
            .map(|state| state.id.clone())
            .ok_or_else(|| ConversationError::StateNotFound(format!("#{reference_id}")))?;

        session.current_state = next_state;
        self.registry.set(tenant, character_id, session);
        self.advance(tenant, character_id).await
    }

    /// Ends the character's conversation. Ending without a session is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches the other commands.
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn end(&self, tenant: &TenantId, character_id: u32) -> Result<(), ConversationError> {
        let _guard = self.locks.lock(*tenant, character_id).await;
        self.finish(tenant, character_id).await;
        Ok(())
    }

    /// Interprets states until one waits for input or the conversation ends.
    /// Only generic actions chain into the next state.
    async fn advance(&self, tenant: &TenantId, character_id: u32) -> Result<(), ConversationError> {
        let mut hops = 0usize;
        loop {
            let mut session = self.registry.get(tenant, character_id)?;
            let step = match session.state() {
                Ok(state) => self
                    .interpret(&session, state)
                    .await
                    .map(|next| (next, matches!(state.kind, StateKind::GenericAction(_)))),
                Err(e) => Err(e),
            };

            let (next, chained) = match step {
                Ok(step) => step,
                Err(e) => {
                    error!(
                        state = %session.current_state,
                        error = %e,
                        "conversation processing failed; clearing session"
                    );
                    self.finish(tenant, character_id).await;
                    return Err(e);
                }
            };

            let Some(next) = next else {
                self.finish(tenant, character_id).await;
                return Ok(());
            };

            session.current_state = next;
            self.registry.set(tenant, character_id, session.clone());
            if !chained {
                return Ok(());
            }

            hops += 1;
            if hops > self.max_auto_advance {
                let e = ConversationError::AutoAdvanceLimit {
                    state: session.current_state.clone(),
                    hops,
                };
                error!(error = %e, "conversation processing failed; clearing session");
                self.finish(tenant, character_id).await;
                return Err(e);
            }
        }
    }

    /// Interprets one state, returning the state to move to or `None` when
    /// the conversation ends.
    async fn interpret(
        &self,
        session: &ConversationSession,
        state: &StateDefinition,
    ) -> Result<Option<String>, ConversationError> {
        debug!(state = %state.id, state_type = state.type_name(), "interpreting state");
        match &state.kind {
            StateKind::Dialogue(dialogue) => {
                self.send(session, dialogue.dialogue_type.message_type(), &dialogue.text)
                    .await?;
                if dialogue.choices.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(state.id.clone()))
                }
            }
            StateKind::ListSelection(list) => {
                self.send(session, MessageType::Simple, &list.menu_text())
                    .await?;
                Ok(Some(state.id.clone()))
            }
            StateKind::GenericAction(action) => self.run_generic_action(session, action).await,
            StateKind::CraftAction(craft) => Ok(Some(craft.success_state.clone())),
        }
    }

    async fn run_generic_action(
        &self,
        session: &ConversationSession,
        action: &GenericAction,
    ) -> Result<Option<String>, ConversationError> {
        if !action.operations.is_empty() {
            let executor = Arc::clone(&self.executor);
            let task_session = session.clone();
            let operations = action.operations.clone();
            let outcome = tokio::spawn(async move {
                executor.execute_batch(&task_session, &operations).await
            })
            .await;
            match outcome {
                Ok(result) => result?,
                Err(join_error) => {
                    return Err(ConversationError::OperationPanicked(join_error.to_string()));
                }
            }
        }

        for outcome in &action.outcomes {
            // Only the first condition of an outcome is consulted.
            let matched = match outcome.conditions.first() {
                None => true,
                Some(condition) => self.evaluator.evaluate(session, condition).await?,
            };
            if matched {
                return Ok(outcome.next_state.clone());
            }
        }
        Ok(None)
    }

    async fn send(
        &self,
        session: &ConversationSession,
        message_type: MessageType,
        text: &str,
    ) -> Result<(), ConversationError> {
        self.messenger
            .send(
                session.field.world_id,
                session.field.channel_id,
                session.character_id,
                session.npc_id,
                message_type,
                text,
            )
            .await?;
        Ok(())
    }

    /// Clears the session and, if one existed, releases the client.
    async fn finish(&self, tenant: &TenantId, character_id: u32) {
        let Some(session) = self.registry.clear(tenant, character_id) else {
            return;
        };
        info!(npc_id = session.npc_id, "conversation ended");
        if let Err(e) = self
            .messenger
            .dispose(session.field.world_id, session.field.channel_id, character_id)
            .await
        {
            warn!(error = %e, "failed to dispose conversation");
        }
    }
}
