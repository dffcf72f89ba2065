//! Shared application state.

use std::sync::Arc;

use parley_conversation::application::evaluator::DefaultConditionEvaluator;
use parley_conversation::application::executor::SagaOperationExecutor;
use parley_conversation::application::ports::{DefinitionRepository, DefinitionStore};
use parley_conversation::application::processor::ConversationProcessor;
use parley_conversation::application::registry::SessionRegistry;
use parley_core::clock::Clock;
use parley_core::messenger::NpcMessenger;
use parley_core::rng::DeterministicRng;
use parley_core::validation::ValidationService;
use parley_saga::producer::SagaProducer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The conversation state machine.
    pub processor: Arc<ConversationProcessor>,
    /// Conversation definitions, for summaries and management.
    pub definitions: Arc<dyn DefinitionStore>,
}

impl AppState {
    /// Wires the engine over its outbound collaborators.
    #[must_use]
    pub fn new<D>(
        definitions: Arc<D>,
        validation: Arc<dyn ValidationService>,
        saga_producer: Arc<dyn SagaProducer>,
        messenger: Arc<dyn NpcMessenger>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self
    where
        D: DefinitionStore + 'static,
    {
        let evaluator = Arc::new(DefaultConditionEvaluator::new(validation, rng));
        let executor = Arc::new(SagaOperationExecutor::new(saga_producer, clock));
        let processor = ConversationProcessor::new(
            Arc::new(SessionRegistry::new()),
            Arc::clone(&definitions) as Arc<dyn DefinitionRepository>,
            evaluator,
            executor,
            messenger,
        );
        Self {
            processor: Arc::new(processor),
            definitions: definitions as Arc<dyn DefinitionStore>,
        }
    }
}
