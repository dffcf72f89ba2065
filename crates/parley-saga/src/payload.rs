//! Saga step actions and their payloads.
//!
//! Each action carries exactly one payload shape, so `StepPayload` is a closed
//! sum type with one variant per action.

use chrono::{DateTime, Utc};
use parley_core::field::Field;
use serde::{Deserialize, Serialize};

/// Action tag identifying what a saga step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    AwardInventory,
    AwardMesos,
    AwardExperience,
    AwardLevel,
    WarpToPortal,
    WarpToRandomPortal,
    ChangeJob,
    CreateSkill,
    UpdateSkill,
    DestroyAsset,
    IncreaseBuddyCapacity,
}

/// Item template and amount granted to a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub template_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardItemPayload {
    pub character_id: u32,
    pub item: ItemPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardMesosPayload {
    pub character_id: u32,
    pub world_id: u8,
    pub channel_id: u8,
    pub actor_id: u32,
    pub actor_type: String,
    pub amount: i32,
}

/// One slice of awarded experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceDistribution {
    pub experience_type: String,
    pub amount: u32,
    pub attr1: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardExperiencePayload {
    pub character_id: u32,
    pub world_id: u8,
    pub channel_id: u8,
    pub distributions: Vec<ExperienceDistribution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardLevelPayload {
    pub character_id: u32,
    pub world_id: u8,
    pub channel_id: u8,
    pub amount: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpToPortalPayload {
    pub character_id: u32,
    pub field: Field,
    pub portal_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpToRandomPortalPayload {
    pub character_id: u32,
    pub field: Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeJobPayload {
    pub character_id: u32,
    pub world_id: u8,
    pub channel_id: u8,
    pub job_id: u16,
}

/// Shared shape of skill creation and update payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPayload {
    pub character_id: u32,
    pub skill_id: u32,
    pub level: u8,
    pub master_level: u8,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyAssetPayload {
    pub character_id: u32,
    pub template_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseBuddyCapacityPayload {
    pub character_id: u32,
    pub world_id: u8,
    pub new_capacity: u8,
}

/// Payload of a saga step, keyed by its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPayload {
    AwardInventory(AwardItemPayload),
    AwardMesos(AwardMesosPayload),
    AwardExperience(AwardExperiencePayload),
    AwardLevel(AwardLevelPayload),
    WarpToPortal(WarpToPortalPayload),
    WarpToRandomPortal(WarpToRandomPortalPayload),
    ChangeJob(ChangeJobPayload),
    CreateSkill(SkillPayload),
    UpdateSkill(SkillPayload),
    DestroyAsset(DestroyAssetPayload),
    IncreaseBuddyCapacity(IncreaseBuddyCapacityPayload),
}

impl StepPayload {
    /// Returns the action tag matching this payload.
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::AwardInventory(_) => Action::AwardInventory,
            Self::AwardMesos(_) => Action::AwardMesos,
            Self::AwardExperience(_) => Action::AwardExperience,
            Self::AwardLevel(_) => Action::AwardLevel,
            Self::WarpToPortal(_) => Action::WarpToPortal,
            Self::WarpToRandomPortal(_) => Action::WarpToRandomPortal,
            Self::ChangeJob(_) => Action::ChangeJob,
            Self::CreateSkill(_) => Action::CreateSkill,
            Self::UpdateSkill(_) => Action::UpdateSkill,
            Self::DestroyAsset(_) => Action::DestroyAsset,
            Self::IncreaseBuddyCapacity(_) => Action::IncreaseBuddyCapacity,
        }
    }

    /// Serializes the payload body without its action tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::AwardInventory(p) => serde_json::to_value(p),
            Self::AwardMesos(p) => serde_json::to_value(p),
            Self::AwardExperience(p) => serde_json::to_value(p),
            Self::AwardLevel(p) => serde_json::to_value(p),
            Self::WarpToPortal(p) => serde_json::to_value(p),
            Self::WarpToRandomPortal(p) => serde_json::to_value(p),
            Self::ChangeJob(p) => serde_json::to_value(p),
            Self::CreateSkill(p) | Self::UpdateSkill(p) => serde_json::to_value(p),
            Self::DestroyAsset(p) => serde_json::to_value(p),
            Self::IncreaseBuddyCapacity(p) => serde_json::to_value(p),
        }
    }

    /// Rebuilds a payload from its action tag and JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not match the shape required by `action`.
    pub fn from_value(action: Action, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match action {
            Action::AwardInventory => Self::AwardInventory(serde_json::from_value(value)?),
            Action::AwardMesos => Self::AwardMesos(serde_json::from_value(value)?),
            Action::AwardExperience => Self::AwardExperience(serde_json::from_value(value)?),
            Action::AwardLevel => Self::AwardLevel(serde_json::from_value(value)?),
            Action::WarpToPortal => Self::WarpToPortal(serde_json::from_value(value)?),
            Action::WarpToRandomPortal => Self::WarpToRandomPortal(serde_json::from_value(value)?),
            Action::ChangeJob => Self::ChangeJob(serde_json::from_value(value)?),
            Action::CreateSkill => Self::CreateSkill(serde_json::from_value(value)?),
            Action::UpdateSkill => Self::UpdateSkill(serde_json::from_value(value)?),
            Action::DestroyAsset => Self::DestroyAsset(serde_json::from_value(value)?),
            Action::IncreaseBuddyCapacity => {
                Self::IncreaseBuddyCapacity(serde_json::from_value(value)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_as_pascal_case_tag() {
        let json = serde_json::to_value(Action::IncreaseBuddyCapacity).unwrap();

        assert_eq!(json, "IncreaseBuddyCapacity");
    }

    #[test]
    fn test_from_value_rejects_mismatched_shape() {
        // Arrange
        let body = serde_json::json!({ "characterId": 1, "worldId": 0 });

        // Act
        let result = StepPayload::from_value(Action::AwardInventory, body);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_skill_payloads_keep_distinct_actions() {
        let skill = SkillPayload {
            character_id: 7,
            skill_id: 1_000_001,
            level: 1,
            master_level: 1,
            expiration: DateTime::<Utc>::UNIX_EPOCH,
        };

        assert_eq!(
            StepPayload::CreateSkill(skill.clone()).action(),
            Action::CreateSkill
        );
        assert_eq!(StepPayload::UpdateSkill(skill).action(), Action::UpdateSkill);
    }
}
