//! Conversation documents as authored.
//!
//! Documents use camelCase field names. Empty strings stand in for absent
//! transitions and item ids, matching what the authoring tools emit.

use std::collections::HashMap;

use parley_conversation::domain::definition::{
    Choice, Condition, ConversationDefinition, CraftAction, Dialogue, DialogueType,
    GenericAction, ListSelection, Operation, Outcome, StateDefinition, StateKind,
};
use parley_conversation::domain::errors::ConversationError;
use serde::Deserialize;
use uuid::Uuid;

/// Root of a conversation document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDocument {
    /// Assigned on conversion when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub npc_id: u32,
    pub start_state: String,
    #[serde(default)]
    pub states: Vec<StateDocument>,
}

/// One state; the body matching `state_type` must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub state_type: String,
    #[serde(default)]
    pub dialogue: Option<DialogueDocument>,
    #[serde(default)]
    pub generic_action: Option<GenericActionDocument>,
    #[serde(default)]
    pub craft_action: Option<CraftActionDocument>,
    #[serde(default)]
    pub list_selection: Option<ListSelectionDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueDocument {
    pub dialogue_type: String,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<ChoiceDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceDocument {
    pub text: String,
    #[serde(default)]
    pub next_state: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericActionDocument {
    #[serde(default)]
    pub operations: Vec<OperationDocument>,
    #[serde(default)]
    pub outcomes: Vec<OutcomeDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDocument {
    #[serde(rename = "type")]
    pub operation_type: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Outcomes carry only conditions and a next state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDocument {
    #[serde(default)]
    pub conditions: Vec<ConditionDocument>,
    #[serde(default)]
    pub next_state: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDocument {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub operator: String,
    pub value: String,
    #[serde(default)]
    pub item_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftActionDocument {
    pub item_id: u32,
    #[serde(default)]
    pub materials: Vec<u32>,
    #[serde(default)]
    pub quantities: Vec<u32>,
    #[serde(default)]
    pub meso_cost: u32,
    #[serde(default)]
    pub stimulator_id: u32,
    #[serde(default)]
    pub stimulator_fail_chance: f64,
    #[serde(default)]
    pub success_state: String,
    #[serde(default)]
    pub failure_state: String,
    #[serde(default)]
    pub missing_materials_state: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSelectionDocument {
    pub title: String,
    #[serde(default)]
    pub choices: Vec<ChoiceDocument>,
}

impl ConversationDocument {
    /// Converts the document into a validated definition.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::InvalidDefinition` if a state's body does
    /// not match its type or the resulting definition fails validation.
    pub fn into_definition(self) -> Result<ConversationDefinition, ConversationError> {
        let states = self
            .states
            .into_iter()
            .map(StateDocument::into_state)
            .collect::<Result<Vec<_>, _>>()?;
        let definition = ConversationDefinition {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            npc_id: self.npc_id,
            start_state: self.start_state,
            states,
        };
        definition.validate()?;
        Ok(definition)
    }
}

impl StateDocument {
    fn into_state(self) -> Result<StateDefinition, ConversationError> {
        let id = self.id;
        let missing_body = |id: &str, state_type: &str| {
            ConversationError::InvalidDefinition(format!(
                "state [{id}]: {state_type} body is missing"
            ))
        };

        let kind = match self.state_type.as_str() {
            "dialogue" => {
                let body = self
                    .dialogue
                    .ok_or_else(|| missing_body(&id, "dialogue"))?;
                let dialogue_type = DialogueType::parse(&body.dialogue_type).ok_or_else(|| {
                    ConversationError::InvalidDefinition(format!(
                        "state [{id}]: unknown dialogue type [{}]",
                        body.dialogue_type
                    ))
                })?;
                StateKind::Dialogue(Dialogue {
                    dialogue_type,
                    text: body.text,
                    choices: body.choices.into_iter().map(ChoiceDocument::into_choice).collect(),
                })
            }
            "genericAction" => {
                let body = self
                    .generic_action
                    .ok_or_else(|| missing_body(&id, "genericAction"))?;
                StateKind::GenericAction(GenericAction {
                    operations: body
                        .operations
                        .into_iter()
                        .map(|operation| Operation {
                            operation_type: operation.operation_type,
                            params: operation.params,
                        })
                        .collect(),
                    outcomes: body
                        .outcomes
                        .into_iter()
                        .map(OutcomeDocument::into_outcome)
                        .collect(),
                })
            }
            "craftAction" => {
                let body = self
                    .craft_action
                    .ok_or_else(|| missing_body(&id, "craftAction"))?;
                StateKind::CraftAction(CraftAction {
                    item_id: body.item_id,
                    materials: body.materials,
                    quantities: body.quantities,
                    meso_cost: body.meso_cost,
                    stimulator_id: (body.stimulator_id != 0).then_some(body.stimulator_id),
                    stimulator_fail_chance: (body.stimulator_fail_chance > 0.0)
                        .then_some(body.stimulator_fail_chance),
                    success_state: body.success_state,
                    failure_state: body.failure_state,
                    missing_materials_state: body.missing_materials_state,
                })
            }
            "listSelection" => {
                let body = self
                    .list_selection
                    .ok_or_else(|| missing_body(&id, "listSelection"))?;
                StateKind::ListSelection(ListSelection {
                    title: body.title,
                    choices: body.choices.into_iter().map(ChoiceDocument::into_choice).collect(),
                })
            }
            other => {
                return Err(ConversationError::InvalidDefinition(format!(
                    "state [{id}]: unknown state type [{other}]"
                )));
            }
        };

        Ok(StateDefinition { id, kind })
    }
}

impl ChoiceDocument {
    fn into_choice(self) -> Choice {
        Choice {
            text: self.text,
            next_state: non_empty(self.next_state),
            context: self.context,
        }
    }
}

impl OutcomeDocument {
    fn into_outcome(self) -> Outcome {
        Outcome {
            conditions: self
                .conditions
                .into_iter()
                .map(|condition| Condition {
                    condition_type: condition.condition_type,
                    operator: condition.operator,
                    value: condition.value,
                    item_id: non_empty(condition.item_id),
                })
                .collect(),
            next_state: non_empty(self.next_state),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
