//! Builders and wiring shared by the application-layer tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parley_core::error::DomainError;
use parley_core::messenger::NpcMessenger;
use parley_core::rng::DeterministicRng;
use parley_core::tenant::TenantId;
use parley_test_support::{
    FixedClock, MockRng, RecordingMessenger, RecordingSagaProducer, ScriptedValidationService,
};
use uuid::Uuid;

use super::evaluator::DefaultConditionEvaluator;
use super::executor::{OperationExecutor, SagaOperationExecutor};
use super::ports::DefinitionRepository;
use super::processor::ConversationProcessor;
use super::registry::SessionRegistry;
use crate::domain::definition::{
    Choice, Condition, ConversationDefinition, CraftAction, Dialogue, DialogueType,
    GenericAction, ListSelection, Operation, Outcome, StateDefinition, StateKind,
};

/// Serves a fixed set of definitions to every tenant.
pub(crate) struct StaticDefinitions {
    definitions: Vec<ConversationDefinition>,
}

impl StaticDefinitions {
    pub(crate) fn new(definitions: Vec<ConversationDefinition>) -> Self {
        Self { definitions }
    }
}

#[async_trait]
impl DefinitionRepository for StaticDefinitions {
    async fn find_by_npc_id(
        &self,
        _tenant: &TenantId,
        npc_id: u32,
    ) -> Result<Option<ConversationDefinition>, DomainError> {
        Ok(self
            .definitions
            .iter()
            .find(|definition| definition.npc_id == npc_id)
            .cloned())
    }
}

/// A processor wired to recording doubles.
pub(crate) struct Harness {
    pub(crate) processor: ConversationProcessor,
    pub(crate) registry: Arc<SessionRegistry>,
    pub(crate) messenger: Arc<RecordingMessenger>,
    pub(crate) sagas: Arc<RecordingSagaProducer>,
    pub(crate) validation: Arc<ScriptedValidationService>,
}

impl Harness {
    pub(crate) fn new(definitions: Vec<ConversationDefinition>) -> Self {
        Self::build(definitions, ScriptedValidationService::always(true), None, None)
    }

    pub(crate) fn with_rng(
        definitions: Vec<ConversationDefinition>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self::build_with_rng(
            definitions,
            ScriptedValidationService::always(true),
            None,
            None,
            rng,
        )
    }

    pub(crate) fn with_validation(
        definitions: Vec<ConversationDefinition>,
        validation: ScriptedValidationService,
    ) -> Self {
        Self::build(definitions, validation, None, None)
    }

    pub(crate) fn with_executor(
        definitions: Vec<ConversationDefinition>,
        executor: Arc<dyn OperationExecutor>,
    ) -> Self {
        Self::build(
            definitions,
            ScriptedValidationService::always(true),
            Some(executor),
            None,
        )
    }

    pub(crate) fn with_messenger(
        definitions: Vec<ConversationDefinition>,
        messenger: Arc<dyn NpcMessenger>,
    ) -> Self {
        Self::build(
            definitions,
            ScriptedValidationService::always(true),
            None,
            Some(messenger),
        )
    }

    fn build(
        definitions: Vec<ConversationDefinition>,
        validation: ScriptedValidationService,
        executor: Option<Arc<dyn OperationExecutor>>,
        messenger: Option<Arc<dyn NpcMessenger>>,
    ) -> Self {
        Self::build_with_rng(definitions, validation, executor, messenger, Box::new(MockRng))
    }

    fn build_with_rng(
        definitions: Vec<ConversationDefinition>,
        validation: ScriptedValidationService,
        executor: Option<Arc<dyn OperationExecutor>>,
        messenger: Option<Arc<dyn NpcMessenger>>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let recording_messenger = Arc::new(RecordingMessenger::new());
        let sagas = Arc::new(RecordingSagaProducer::new());
        let validation = Arc::new(validation);
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));

        let executor: Arc<dyn OperationExecutor> = match executor {
            Some(executor) => executor,
            None => Arc::new(SagaOperationExecutor::new(sagas.clone(), clock)),
        };
        let messenger: Arc<dyn NpcMessenger> = match messenger {
            Some(messenger) => messenger,
            None => recording_messenger.clone(),
        };
        let evaluator = Arc::new(DefaultConditionEvaluator::new(validation.clone(), rng));

        let processor = ConversationProcessor::new(
            registry.clone(),
            Arc::new(StaticDefinitions::new(definitions)),
            evaluator,
            executor,
            messenger,
        );

        Self {
            processor,
            registry,
            messenger: recording_messenger,
            sagas,
            validation,
        }
    }
}

pub(crate) fn definition(
    npc_id: u32,
    start_state: &str,
    states: Vec<StateDefinition>,
) -> ConversationDefinition {
    ConversationDefinition {
        id: Uuid::new_v4(),
        npc_id,
        start_state: start_state.to_owned(),
        states,
    }
}

pub(crate) fn dialogue(
    id: &str,
    dialogue_type: DialogueType,
    text: &str,
    choices: Vec<Choice>,
) -> StateDefinition {
    StateDefinition {
        id: id.to_owned(),
        kind: StateKind::Dialogue(Dialogue {
            dialogue_type,
            text: text.to_owned(),
            choices,
        }),
    }
}

pub(crate) fn list(id: &str, title: &str, choices: Vec<Choice>) -> StateDefinition {
    StateDefinition {
        id: id.to_owned(),
        kind: StateKind::ListSelection(ListSelection {
            title: title.to_owned(),
            choices,
        }),
    }
}

pub(crate) fn generic(
    id: &str,
    operations: Vec<Operation>,
    outcomes: Vec<Outcome>,
) -> StateDefinition {
    StateDefinition {
        id: id.to_owned(),
        kind: StateKind::GenericAction(GenericAction {
            operations,
            outcomes,
        }),
    }
}

pub(crate) fn craft(id: &str, success_state: &str) -> StateDefinition {
    StateDefinition {
        id: id.to_owned(),
        kind: StateKind::CraftAction(CraftAction {
            item_id: 1_302_000,
            materials: vec![4_011_000],
            quantities: vec![2],
            meso_cost: 1_000,
            stimulator_id: None,
            stimulator_fail_chance: None,
            success_state: success_state.to_owned(),
            failure_state: success_state.to_owned(),
            missing_materials_state: success_state.to_owned(),
        }),
    }
}

pub(crate) fn choice(text: &str, next_state: Option<&str>) -> Choice {
    Choice {
        text: text.to_owned(),
        next_state: next_state.map(str::to_owned),
        context: HashMap::new(),
    }
}

pub(crate) fn operation(operation_type: &str, params: &[(&str, &str)]) -> Operation {
    Operation {
        operation_type: operation_type.to_owned(),
        params: params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect(),
    }
}

pub(crate) fn outcome(conditions: Vec<Condition>, next_state: Option<&str>) -> Outcome {
    Outcome {
        conditions,
        next_state: next_state.map(str::to_owned),
    }
}

pub(crate) fn condition(condition_type: &str, operator: &str, value: &str) -> Condition {
    Condition {
        condition_type: condition_type.to_owned(),
        operator: operator.to_owned(),
        value: value.to_owned(),
        item_id: None,
    }
}
