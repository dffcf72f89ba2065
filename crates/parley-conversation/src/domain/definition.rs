//! Conversation definitions: the immutable declarative tree an NPC speaks.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use parley_core::messenger::MessageType;
use uuid::Uuid;

use super::errors::ConversationError;

/// Choice text reached through cancel rather than an explicit selection.
pub const EXIT_CHOICE: &str = "Exit";

/// Client action code for closing a dialog window.
const ACTION_EXIT: u8 = 255;

/// A conversation tree owned by one NPC.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationDefinition {
    pub id: Uuid,
    pub npc_id: u32,
    pub start_state: String,
    pub states: Vec<StateDefinition>,
}

impl ConversationDefinition {
    /// Looks up a state by id.
    #[must_use]
    pub fn find_state(&self, id: &str) -> Option<&StateDefinition> {
        self.states.iter().find(|state| state.id == id)
    }

    /// Checks structural invariants: the start state and every transition
    /// target exist, state ids are unique, and each state variant is well
    /// formed.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::InvalidDefinition` describing the first
    /// violation found.
    pub fn validate(&self) -> Result<(), ConversationError> {
        if self.npc_id == 0 {
            return Err(invalid("npcId is required"));
        }
        if self.start_state.is_empty() {
            return Err(invalid("startState is required"));
        }
        if self.states.is_empty() {
            return Err(invalid("at least one state is required"));
        }

        let mut ids = HashSet::new();
        for state in &self.states {
            if state.id.is_empty() {
                return Err(invalid("state id is required"));
            }
            if !ids.insert(state.id.as_str()) {
                return Err(invalid(format!("duplicate state [{}]", state.id)));
            }
        }
        if !ids.contains(self.start_state.as_str()) {
            return Err(invalid(format!(
                "start state [{}] does not exist",
                self.start_state
            )));
        }

        for state in &self.states {
            state.kind.validate(&state.id)?;
            for target in state.kind.transitions() {
                if !ids.contains(target) {
                    return Err(invalid(format!(
                        "state [{}] transitions to unknown state [{target}]",
                        state.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConversationError {
    ConversationError::InvalidDefinition(message.into())
}

/// A single node of the conversation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDefinition {
    pub id: String,
    pub kind: StateKind,
}

impl StateDefinition {
    /// Short name of this state's variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// The four state variants. Exactly one is populated per state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateKind {
    Dialogue(Dialogue),
    GenericAction(GenericAction),
    CraftAction(CraftAction),
    ListSelection(ListSelection),
}

impl StateKind {
    /// Authoring name of the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Dialogue(_) => "dialogue",
            Self::GenericAction(_) => "genericAction",
            Self::CraftAction(_) => "craftAction",
            Self::ListSelection(_) => "listSelection",
        }
    }

    /// Every non-empty state id this state can transition to.
    fn transitions(&self) -> Vec<&str> {
        match self {
            Self::Dialogue(dialogue) => choice_targets(&dialogue.choices),
            Self::ListSelection(list) => choice_targets(&list.choices),
            Self::GenericAction(action) => action
                .outcomes
                .iter()
                .filter_map(|outcome| outcome.next_state.as_deref())
                .collect(),
            Self::CraftAction(craft) => [
                craft.success_state.as_str(),
                craft.failure_state.as_str(),
                craft.missing_materials_state.as_str(),
            ]
            .into_iter()
            .filter(|target| !target.is_empty())
            .collect(),
        }
    }

    fn validate(&self, state_id: &str) -> Result<(), ConversationError> {
        match self {
            Self::Dialogue(dialogue) => dialogue.validate(state_id),
            Self::ListSelection(list) => {
                if list.title.is_empty() {
                    return Err(invalid(format!("state [{state_id}]: title is required")));
                }
                Ok(())
            }
            Self::GenericAction(action) => action.validate(state_id),
            Self::CraftAction(craft) => craft.validate(state_id),
        }
    }
}

fn choice_targets(choices: &[Choice]) -> Vec<&str> {
    choices
        .iter()
        .filter_map(|choice| choice.next_state.as_deref())
        .collect()
}

/// Display type of a dialogue window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogueType {
    SendOk,
    SendYesNo,
    SendSimple,
    SendNext,
    SendNextPrevious,
}

impl DialogueType {
    /// Parses the authoring name (`sendOk`, `sendYesNo`, ...).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sendOk" => Some(Self::SendOk),
            "sendYesNo" => Some(Self::SendYesNo),
            "sendSimple" => Some(Self::SendSimple),
            "sendNext" => Some(Self::SendNext),
            "sendNextPrevious" => Some(Self::SendNextPrevious),
            _ => None,
        }
    }

    /// Authoring name of the display type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendOk => "sendOk",
            Self::SendYesNo => "sendYesNo",
            Self::SendSimple => "sendSimple",
            Self::SendNext => "sendNext",
            Self::SendNextPrevious => "sendNextPrevious",
        }
    }

    /// Client window used to display this dialogue.
    #[must_use]
    pub const fn message_type(self) -> MessageType {
        match self {
            Self::SendOk => MessageType::Ok,
            Self::SendYesNo => MessageType::YesNo,
            Self::SendSimple => MessageType::Simple,
            Self::SendNext => MessageType::Next,
            Self::SendNextPrevious => MessageType::NextPrevious,
        }
    }
}

/// A text window with a fixed set of choice slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialogue {
    pub dialogue_type: DialogueType,
    pub text: String,
    pub choices: Vec<Choice>,
}

impl Dialogue {
    /// Maps the client's raw input onto one of this dialogue's choices.
    ///
    /// Button windows resolve by choice name: action `255` closes the window
    /// (`Exit`), `0` is the negative button (`No` or `Previous`) and anything
    /// else the positive one. An ok window has a single slot. A simple
    /// window indexes its choices by `selection`, with `0`/`255` cancelling.
    #[must_use]
    pub fn choice_for(&self, action: u8, selection: i32) -> Option<&Choice> {
        let name = match self.dialogue_type {
            DialogueType::SendOk => return self.choices.first(),
            DialogueType::SendSimple => {
                if action == 0 || action == ACTION_EXIT {
                    EXIT_CHOICE
                } else {
                    return usize::try_from(selection)
                        .ok()
                        .and_then(|index| self.choices.get(index));
                }
            }
            DialogueType::SendNext => {
                if action == ACTION_EXIT {
                    EXIT_CHOICE
                } else {
                    "Next"
                }
            }
            DialogueType::SendNextPrevious => match action {
                ACTION_EXIT => EXIT_CHOICE,
                0 => "Previous",
                _ => "Next",
            },
            DialogueType::SendYesNo => match action {
                ACTION_EXIT => EXIT_CHOICE,
                0 => "No",
                _ => "Yes",
            },
        };
        self.choices.iter().find(|choice| choice.text == name)
    }

    fn validate(&self, state_id: &str) -> Result<(), ConversationError> {
        if self.text.is_empty() {
            return Err(invalid(format!("state [{state_id}]: text is required")));
        }
        let count = self.choices.len();
        let expected = match self.dialogue_type {
            DialogueType::SendOk => Some(1),
            DialogueType::SendNext => Some(2),
            DialogueType::SendYesNo | DialogueType::SendNextPrevious => Some(3),
            DialogueType::SendSimple => None,
        };
        match expected {
            Some(expected) if count != expected => Err(invalid(format!(
                "state [{state_id}]: {} requires exactly {expected} choices, found {count}",
                self.dialogue_type.as_str()
            ))),
            None if count == 0 => Err(invalid(format!(
                "state [{state_id}]: sendSimple requires at least 1 choice"
            ))),
            _ => Ok(()),
        }
    }
}

/// A selectable option. An absent `next_state` ends the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Choice {
    pub text: String,
    pub next_state: Option<String>,
    /// Merged into the session context when the choice is taken.
    pub context: HashMap<String, String>,
}

/// A menu of choices addressed by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSelection {
    pub title: String,
    pub choices: Vec<Choice>,
}

impl ListSelection {
    /// Resolves the client's input. Action `0` is cancel and picks the `Exit`
    /// choice; otherwise `selection` indexes into the declared choices.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::InvalidSelection` when cancel has no `Exit`
    /// choice to land on or `selection` is out of bounds.
    pub fn choice_for(&self, action: u8, selection: i32) -> Result<&Choice, ConversationError> {
        let chosen = if action == 0 {
            self.choices.iter().find(|choice| choice.text == EXIT_CHOICE)
        } else {
            usize::try_from(selection)
                .ok()
                .and_then(|index| self.choices.get(index))
        };
        chosen.ok_or(ConversationError::InvalidSelection { action, selection })
    }

    /// Renders the title followed by one menu entry per selectable choice.
    #[must_use]
    pub fn menu_text(&self) -> String {
        let mut text = self.title.clone();
        for (index, choice) in self.choices.iter().enumerate() {
            if choice.text == EXIT_CHOICE {
                continue;
            }
            let _ = write!(text, "\r\n#L{index}##b{}#k#l", choice.text);
        }
        text
    }
}

/// Operations run unconditionally, then outcomes pick the next state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericAction {
    pub operations: Vec<Operation>,
    pub outcomes: Vec<Outcome>,
}

impl GenericAction {
    fn validate(&self, state_id: &str) -> Result<(), ConversationError> {
        if self.operations.is_empty() && self.outcomes.is_empty() {
            return Err(invalid(format!(
                "state [{state_id}]: at least one operation or outcome is required"
            )));
        }
        if self.operations.iter().any(|op| op.operation_type.is_empty()) {
            return Err(invalid(format!(
                "state [{state_id}]: operation type is required"
            )));
        }
        for condition in self.outcomes.iter().flat_map(|o| &o.conditions) {
            if condition.condition_type.is_empty()
                || condition.operator.is_empty()
                || condition.value.is_empty()
            {
                return Err(invalid(format!(
                    "state [{state_id}]: condition requires type, operator and value"
                )));
            }
        }
        Ok(())
    }
}

/// A side effect: a type name plus string parameters, any of which may be a
/// `context.<key>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Operation {
    pub operation_type: String,
    pub params: HashMap<String, String>,
}

/// A guarded transition. An outcome without conditions always matches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    pub conditions: Vec<Condition>,
    pub next_state: Option<String>,
}

/// A predicate over character state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    pub condition_type: String,
    pub operator: String,
    /// Integer literal or `context.<key>` reference.
    pub value: String,
    /// Opaque item key for item conditions.
    pub item_id: Option<String>,
}

/// Crafting recipe. Material consumption is not performed; the state always
/// routes to `success_state`.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftAction {
    pub item_id: u32,
    pub materials: Vec<u32>,
    pub quantities: Vec<u32>,
    pub meso_cost: u32,
    pub stimulator_id: Option<u32>,
    pub stimulator_fail_chance: Option<f64>,
    pub success_state: String,
    pub failure_state: String,
    pub missing_materials_state: String,
}

impl CraftAction {
    fn validate(&self, state_id: &str) -> Result<(), ConversationError> {
        if self.item_id == 0 {
            return Err(invalid(format!("state [{state_id}]: itemId is required")));
        }
        if self.materials.is_empty() {
            return Err(invalid(format!(
                "state [{state_id}]: at least one material is required"
            )));
        }
        if self.materials.len() != self.quantities.len() {
            return Err(invalid(format!(
                "state [{state_id}]: quantities must match materials"
            )));
        }
        for (name, target) in [
            ("successState", &self.success_state),
            ("failureState", &self.failure_state),
            ("missingMaterialsState", &self.missing_materials_state),
        ] {
            if target.is_empty() {
                return Err(invalid(format!("state [{state_id}]: {name} is required")));
            }
        }
        Ok(())
    }
}
