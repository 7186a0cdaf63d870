use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(rename = "skillId")]
    pub id: Uuid,
    #[serde(rename = "skillName")]
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "userId")]
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A skill as shown in the browse list, with its owner's name when the
/// listing is not the caller's own skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SkillListing {
    pub skill_id: Uuid,
    pub skill_name: String,
    pub description: String,
    pub category: String,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSkill {
    pub name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillFilter {
    All,
    OwnedBy(Uuid),
    NotOwnedBy(Uuid),
}

impl SkillFilter {
    pub fn from_query(user_id: Option<Uuid>, own_skills: bool) -> Self {
        match (user_id, own_skills) {
            (Some(id), true) => SkillFilter::OwnedBy(id),
            (Some(id), false) => SkillFilter::NotOwnedBy(id),
            (None, _) => SkillFilter::All,
        }
    }
}
