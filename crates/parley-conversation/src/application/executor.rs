//! Operation execution.
//!
//! `local:` operations run in-process. Every other operation becomes one
//! saga step; a batch submits all of its saga steps as a single saga after
//! the local operations have run.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use parley_core::clock::Clock;
use parley_saga::payload::{
    AwardExperiencePayload, AwardItemPayload, AwardLevelPayload, AwardMesosPayload,
    ChangeJobPayload, DestroyAssetPayload, ExperienceDistribution, IncreaseBuddyCapacityPayload,
    ItemPayload, SkillPayload, WarpToPortalPayload, WarpToRandomPortalPayload,
};
use parley_saga::{Saga, SagaProducer, SagaType, Step, StepPayload};
use tracing::{debug, error, info};

use crate::domain::definition::Operation;
use crate::domain::errors::ConversationError;
use crate::domain::session::ConversationSession;

const LOCAL_PREFIX: &str = "local:";
const BATCH_INITIATOR: &str = "npc-conversation-batch";
const SKILL_EXPIRATION_DAYS: i64 = 365;

/// Runs the side effects of generic-action states.
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    /// Executes a single operation for the session's character.
    async fn execute(
        &self,
        session: &ConversationSession,
        operation: &Operation,
    ) -> Result<(), ConversationError>;

    /// Executes `operations`: local ones first in declaration order, stopping
    /// at the first failure, then every saga operation as one saga.
    async fn execute_batch(
        &self,
        session: &ConversationSession,
        operations: &[Operation],
    ) -> Result<(), ConversationError>;
}

/// Executor that submits saga operations to the orchestrator.
pub struct SagaOperationExecutor {
    producer: Arc<dyn SagaProducer>,
    clock: Arc<dyn Clock>,
}

impl SagaOperationExecutor {
    /// Creates an executor.
    #[must_use]
    pub fn new(producer: Arc<dyn SagaProducer>, clock: Arc<dyn Clock>) -> Self {
        Self { producer, clock }
    }

    async fn submit(&self, saga: Saga) -> Result<(), ConversationError> {
        debug!(
            transaction_id = %saga.transaction_id,
            steps = saga.steps.len(),
            "submitting saga"
        );
        self.producer
            .create(&saga)
            .await
            .map_err(ConversationError::SagaDispatch)
    }

    fn build_step(
        &self,
        session: &ConversationSession,
        operation: &Operation,
    ) -> Result<Step, ConversationError> {
        let step_id = format!("{}-{}", operation.operation_type, session.character_id);
        let params = Params { session, operation };
        let character_id = session.character_id;
        let field = session.field;

        let payload = match operation.operation_type.as_str() {
            "award_item" => StepPayload::AwardInventory(AwardItemPayload {
                character_id,
                item: ItemPayload {
                    template_id: params.int("itemId", None)?,
                    quantity: params.int("quantity", None)?,
                },
            }),
            "award_mesos" => StepPayload::AwardMesos(AwardMesosPayload {
                character_id,
                world_id: field.world_id,
                channel_id: field.channel_id,
                actor_id: params.int("actorId", Some(0))?,
                actor_type: params.text("actorType", "NPC")?,
                amount: params.int("amount", None)?,
            }),
            "award_exp" => StepPayload::AwardExperience(AwardExperiencePayload {
                character_id,
                world_id: field.world_id,
                channel_id: field.channel_id,
                distributions: vec![ExperienceDistribution {
                    experience_type: params.text("type", "WHITE")?,
                    amount: params.int("amount", None)?,
                    attr1: params.int("attr1", Some(0))?,
                }],
            }),
            "award_level" => StepPayload::AwardLevel(AwardLevelPayload {
                character_id,
                world_id: field.world_id,
                channel_id: field.channel_id,
                amount: params.int("amount", None)?,
            }),
            "warp_to_map" => StepPayload::WarpToPortal(WarpToPortalPayload {
                character_id,
                field: field.with_map(params.int("mapId", Some(0))?),
                portal_id: params.int("portalId", Some(0))?,
            }),
            "warp_to_random_portal" => {
                StepPayload::WarpToRandomPortal(WarpToRandomPortalPayload {
                    character_id,
                    field: field.with_map(params.int("mapId", Some(0))?),
                })
            }
            "change_job" => StepPayload::ChangeJob(ChangeJobPayload {
                character_id,
                world_id: field.world_id,
                channel_id: field.channel_id,
                job_id: params.int("jobId", None)?,
            }),
            "create_skill" => StepPayload::CreateSkill(self.skill_payload(&params)?),
            "update_skill" => StepPayload::UpdateSkill(self.skill_payload(&params)?),
            "destroy_item" => StepPayload::DestroyAsset(DestroyAssetPayload {
                character_id,
                template_id: params.int("itemId", None)?,
                quantity: params.int("quantity", None)?,
            }),
            "increase_buddy_capacity" => {
                StepPayload::IncreaseBuddyCapacity(IncreaseBuddyCapacityPayload {
                    character_id,
                    world_id: field.world_id,
                    new_capacity: params.int_within("amount", None, 1, 255)?,
                })
            }
            other => return Err(ConversationError::UnknownOperation(other.to_owned())),
        };

        Ok(Step::pending(step_id, payload))
    }

    fn skill_payload(&self, params: &Params<'_>) -> Result<SkillPayload, ConversationError> {
        Ok(SkillPayload {
            character_id: params.session.character_id,
            skill_id: params.int("skillId", None)?,
            level: params.int("level", Some(1))?,
            master_level: params.int("masterLevel", Some(1))?,
            expiration: self.clock.now() + Duration::days(SKILL_EXPIRATION_DAYS),
        })
    }
}

fn is_local(operation: &Operation) -> bool {
    operation.operation_type.starts_with(LOCAL_PREFIX)
}

fn execute_local(
    session: &ConversationSession,
    operation: &Operation,
) -> Result<(), ConversationError> {
    let local_type = operation
        .operation_type
        .strip_prefix(LOCAL_PREFIX)
        .unwrap_or(&operation.operation_type);

    match local_type {
        "log" => {
            let message = local_message(session, operation, "log")?;
            info!(character_id = session.character_id, "NPC log: {message}");
        }
        "debug" => {
            let message = local_message(session, operation, "debug")?;
            debug!(character_id = session.character_id, "NPC debug: {message}");
        }
        other => return Err(ConversationError::UnknownLocalOperation(other.to_owned())),
    }
    Ok(())
}

fn local_message<'a>(
    session: &'a ConversationSession,
    operation: &'a Operation,
    operation_name: &str,
) -> Result<&'a str, ConversationError> {
    let raw = operation
        .params
        .get("message")
        .ok_or_else(|| ConversationError::MissingParameter {
            operation: operation_name.to_owned(),
            parameter: "message",
        })?;
    session.resolve(raw)
}

/// Integer types an operation parameter can be narrowed into.
trait ParamInt: TryFrom<i64> {
    const MIN: i64;
    const MAX: i64;
}

impl ParamInt for u8 {
    const MIN: i64 = 0;
    const MAX: i64 = 255;
}

impl ParamInt for u16 {
    const MIN: i64 = 0;
    const MAX: i64 = 65_535;
}

impl ParamInt for u32 {
    const MIN: i64 = 0;
    const MAX: i64 = 4_294_967_295;
}

impl ParamInt for i32 {
    const MIN: i64 = -2_147_483_648;
    const MAX: i64 = 2_147_483_647;
}

/// Parameter access for one operation, resolving context references through
/// the session.
struct Params<'a> {
    session: &'a ConversationSession,
    operation: &'a Operation,
}

impl Params<'_> {
    fn missing(&self, name: &'static str) -> ConversationError {
        ConversationError::MissingParameter {
            operation: self.operation.operation_type.clone(),
            parameter: name,
        }
    }

    fn text(&self, name: &'static str, default: &str) -> Result<String, ConversationError> {
        match self.operation.params.get(name) {
            Some(raw) => self.session.resolve(raw).map(str::to_owned),
            None => Ok(default.to_owned()),
        }
    }

    fn int<T: ParamInt>(
        &self,
        name: &'static str,
        default: Option<T>,
    ) -> Result<T, ConversationError> {
        self.int_within(name, default, T::MIN, T::MAX)
    }

    fn int_within<T: ParamInt>(
        &self,
        name: &'static str,
        default: Option<T>,
        min: i64,
        max: i64,
    ) -> Result<T, ConversationError> {
        let Some(raw) = self.operation.params.get(name) else {
            return default.ok_or_else(|| self.missing(name));
        };
        let value = self.session.resolve_int(name, raw)?;
        let out_of_range = || ConversationError::OutOfRange {
            operation: self.operation.operation_type.clone(),
            parameter: name,
            value,
            min,
            max,
        };
        if !(min..=max).contains(&value) {
            return Err(out_of_range());
        }
        T::try_from(value).map_err(|_| out_of_range())
    }
}

#[async_trait]
impl OperationExecutor for SagaOperationExecutor {
    async fn execute(
        &self,
        session: &ConversationSession,
        operation: &Operation,
    ) -> Result<(), ConversationError> {
        debug!(
            operation_type = %operation.operation_type,
            character_id = session.character_id,
            "executing operation"
        );

        if is_local(operation) {
            return execute_local(session, operation);
        }

        let step = self.build_step(session, operation).inspect_err(|e| {
            error!(
                operation_type = %operation.operation_type,
                error = %e,
                "failed to build saga step"
            );
        })?;
        let saga = Saga::new(
            SagaType::InventoryTransaction,
            format!("npc-conversation-{}", operation.operation_type),
        )
        .with_step(step);
        self.submit(saga).await
    }

    async fn execute_batch(
        &self,
        session: &ConversationSession,
        operations: &[Operation],
    ) -> Result<(), ConversationError> {
        debug!(
            count = operations.len(),
            character_id = session.character_id,
            "executing operations"
        );

        let (local, remote): (Vec<&Operation>, Vec<&Operation>) =
            operations.iter().partition(|operation| is_local(operation));

        for operation in local {
            execute_local(session, operation)?;
        }

        if remote.is_empty() {
            return Ok(());
        }

        let mut saga = Saga::new(SagaType::InventoryTransaction, BATCH_INITIATOR);
        for operation in remote {
            let step = self.build_step(session, operation).inspect_err(|e| {
                error!(
                    operation_type = %operation.operation_type,
                    error = %e,
                    "failed to build saga step"
                );
            })?;
            saga.steps.push(step);
        }
        self.submit(saga).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use parley_core::field::Field;
    use parley_saga::Status;
    use parley_test_support::{FailingSagaProducer, FixedClock, RecordingSagaProducer};
    use uuid::Uuid;

    use super::*;
    use crate::domain::definition::ConversationDefinition;

    const CHARACTER_ID: u32 = 12_345;

    fn session(context: &[(&str, &str)]) -> ConversationSession {
        let definition = Arc::new(ConversationDefinition {
            id: Uuid::new_v4(),
            npc_id: 9_201_000,
            start_state: "start".to_owned(),
            states: vec![],
        });
        let mut session =
            ConversationSession::new(Field::new(1, 2, 100_000_000), CHARACTER_ID, definition);
        session.context = context
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        session
    }

    fn operation(operation_type: &str, params: &[(&str, &str)]) -> Operation {
        Operation {
            operation_type: operation_type.to_owned(),
            params: params
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn executor(producer: Arc<dyn SagaProducer>) -> SagaOperationExecutor {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        SagaOperationExecutor::new(producer, Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn test_increase_buddy_capacity_builds_single_step_saga() {
        // Arrange
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());

        // Act
        executor
            .execute(
                &session(&[]),
                &operation("increase_buddy_capacity", &[("amount", "25")]),
            )
            .await
            .unwrap();

        // Assert
        let sagas = producer.created_sagas();
        assert_eq!(sagas.len(), 1);
        let saga = &sagas[0];
        assert_eq!(saga.saga_type, SagaType::InventoryTransaction);
        assert_eq!(saga.initiated_by, "npc-conversation-increase_buddy_capacity");
        assert_eq!(saga.steps.len(), 1);
        let step = &saga.steps[0];
        assert_eq!(step.step_id, "increase_buddy_capacity-12345");
        assert_eq!(step.status, Status::Pending);
        match &step.payload {
            StepPayload::IncreaseBuddyCapacity(payload) => {
                assert_eq!(payload.new_capacity, 25);
                assert_eq!(payload.world_id, 1);
                assert_eq!(payload.character_id, CHARACTER_ID);
            }
            other => panic!("expected IncreaseBuddyCapacity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_increase_buddy_capacity_rejects_out_of_range_amounts() {
        let executor = executor(Arc::new(RecordingSagaProducer::new()));

        for amount in ["0", "256", "-5"] {
            let result = executor
                .execute(
                    &session(&[]),
                    &operation("increase_buddy_capacity", &[("amount", amount)]),
                )
                .await;

            match result {
                Err(error @ ConversationError::OutOfRange { .. }) => {
                    let message = error.to_string();
                    assert!(message.contains(&format!("[{amount}]")), "{message}");
                    assert!(message.contains("[1,255]"), "{message}");
                }
                other => panic!("expected OutOfRange, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_increase_buddy_capacity_rejects_non_integer_amount() {
        let executor = executor(Arc::new(RecordingSagaProducer::new()));

        let result = executor
            .execute(
                &session(&[]),
                &operation("increase_buddy_capacity", &[("amount", "5.5")]),
            )
            .await;

        match result {
            Err(error @ ConversationError::InvalidInteger { .. }) => assert_eq!(
                error.to_string(),
                "value [5.5] for parameter [amount] is not a valid integer"
            ),
            other => panic!("expected InvalidInteger, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_required_parameter_fails() {
        let executor = executor(Arc::new(RecordingSagaProducer::new()));

        let result = executor
            .execute(&session(&[]), &operation("increase_buddy_capacity", &[]))
            .await;

        match result {
            Err(error @ ConversationError::MissingParameter { .. }) => assert_eq!(
                error.to_string(),
                "missing amount parameter for increase_buddy_capacity operation"
            ),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_context_reference_resolves_parameter() {
        // Arrange
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());
        let session = session(&[("capacity", "50")]);

        // Act
        executor
            .execute(
                &session,
                &operation("increase_buddy_capacity", &[("amount", "context.capacity")]),
            )
            .await
            .unwrap();

        // Assert
        match &producer.created_sagas()[0].steps[0].payload {
            StepPayload::IncreaseBuddyCapacity(payload) => assert_eq!(payload.new_capacity, 50),
            other => panic!("expected IncreaseBuddyCapacity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_context_key_fails() {
        let executor = executor(Arc::new(RecordingSagaProducer::new()));

        let result = executor
            .execute(
                &session(&[]),
                &operation("award_mesos", &[("amount", "context.missing")]),
            )
            .await;

        match result {
            Err(error @ ConversationError::ContextKeyNotFound(_)) => {
                assert_eq!(error.to_string(), "context key [missing] not found");
            }
            other => panic!("expected ContextKeyNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_award_mesos_applies_defaults() {
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());

        executor
            .execute(&session(&[]), &operation("award_mesos", &[("amount", "-1000")]))
            .await
            .unwrap();

        match &producer.created_sagas()[0].steps[0].payload {
            StepPayload::AwardMesos(payload) => {
                assert_eq!(payload.amount, -1000);
                assert_eq!(payload.actor_id, 0);
                assert_eq!(payload.actor_type, "NPC");
                assert_eq!(payload.world_id, 1);
                assert_eq!(payload.channel_id, 2);
            }
            other => panic!("expected AwardMesos, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_skill_defaults_levels_and_expires_in_a_year() {
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());

        executor
            .execute(&session(&[]), &operation("create_skill", &[("skillId", "1001003")]))
            .await
            .unwrap();

        match &producer.created_sagas()[0].steps[0].payload {
            StepPayload::CreateSkill(payload) => {
                assert_eq!(payload.skill_id, 1_001_003);
                assert_eq!(payload.level, 1);
                assert_eq!(payload.master_level, 1);
                assert_eq!(
                    payload.expiration,
                    Utc.with_ymd_and_hms(2027, 1, 15, 10, 0, 0).unwrap()
                );
            }
            other => panic!("expected CreateSkill, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_warp_to_map_keeps_world_and_channel() {
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());

        executor
            .execute(
                &session(&[]),
                &operation("warp_to_map", &[("mapId", "101000000"), ("portalId", "2")]),
            )
            .await
            .unwrap();

        match &producer.created_sagas()[0].steps[0].payload {
            StepPayload::WarpToPortal(payload) => {
                assert_eq!(payload.field, Field::new(1, 2, 101_000_000));
                assert_eq!(payload.portal_id, 2);
            }
            other => panic!("expected WarpToPortal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_operation_fails() {
        let executor = executor(Arc::new(RecordingSagaProducer::new()));

        let result = executor
            .execute(&session(&[]), &operation("summon_boss", &[]))
            .await;

        match result {
            Err(error @ ConversationError::UnknownOperation(_)) => {
                assert_eq!(error.to_string(), "unknown operation type: summon_boss");
            }
            other => panic!("expected UnknownOperation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_local_log_requires_message() {
        let executor = executor(Arc::new(RecordingSagaProducer::new()));

        let ok = executor
            .execute(
                &session(&[("name", "Mai")]),
                &operation("local:log", &[("message", "context.name")]),
            )
            .await;
        let missing = executor
            .execute(&session(&[]), &operation("local:debug", &[]))
            .await;
        let unknown = executor
            .execute(&session(&[]), &operation("local:shout", &[("message", "hi")]))
            .await;

        assert!(ok.is_ok());
        assert!(matches!(
            missing,
            Err(ConversationError::MissingParameter { parameter: "message", .. })
        ));
        assert!(matches!(
            unknown,
            Err(ConversationError::UnknownLocalOperation(kind)) if kind == "shout"
        ));
    }

    #[tokio::test]
    async fn test_batch_runs_locals_then_one_saga_in_order() {
        // Arrange
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());
        let operations = vec![
            operation("award_item", &[("itemId", "2000000"), ("quantity", "5")]),
            operation("local:log", &[("message", "granted")]),
            operation("award_exp", &[("amount", "300")]),
        ];

        // Act
        executor
            .execute_batch(&session(&[]), &operations)
            .await
            .unwrap();

        // Assert
        let sagas = producer.created_sagas();
        assert_eq!(sagas.len(), 1);
        assert_eq!(sagas[0].initiated_by, "npc-conversation-batch");
        let step_ids: Vec<&str> = sagas[0].steps.iter().map(|s| s.step_id.as_str()).collect();
        assert_eq!(step_ids, vec!["award_item-12345", "award_exp-12345"]);
        match &sagas[0].steps[1].payload {
            StepPayload::AwardExperience(payload) => {
                assert_eq!(payload.distributions[0].experience_type, "WHITE");
                assert_eq!(payload.distributions[0].amount, 300);
            }
            other => panic!("expected AwardExperience, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_local_failure_aborts_before_saga() {
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());
        let operations = vec![
            operation("award_item", &[("itemId", "2000000"), ("quantity", "5")]),
            operation("local:explode", &[]),
        ];

        let result = executor.execute_batch(&session(&[]), &operations).await;

        assert!(matches!(result, Err(ConversationError::UnknownLocalOperation(_))));
        assert!(producer.created_sagas().is_empty());
    }

    #[tokio::test]
    async fn test_batch_with_only_locals_submits_nothing() {
        let producer = Arc::new(RecordingSagaProducer::new());
        let executor = executor(producer.clone());

        executor
            .execute_batch(
                &session(&[]),
                &[operation("local:debug", &[("message", "hello")])],
            )
            .await
            .unwrap();

        assert!(producer.created_sagas().is_empty());
    }

    #[tokio::test]
    async fn test_saga_producer_failure_surfaces_as_dispatch_error() {
        let executor = executor(Arc::new(FailingSagaProducer));

        let result = executor
            .execute(&session(&[]), &operation("change_job", &[("jobId", "100")]))
            .await;

        match result {
            Err(ConversationError::SagaDispatch(_)) => {}
            other => panic!("expected SagaDispatch, got {other:?}"),
        }
    }
}
