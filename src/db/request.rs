use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::lifecycle::RequestStatus;

/// A request together with the owner of the skill it targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    #[serde(rename = "requestId")]
    pub id: Uuid,
    pub requester_id: Uuid,
    pub skill_id: Uuid,
    pub skill_owner_id: Uuid,
    pub status: RequestStatus,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ExchangeRequest {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.requester_id == user_id || self.skill_owner_id == user_id
    }
}

/// Row of the sent/received request tables. `user_name` is the other party:
/// the skill owner for sent requests, the requester for received ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub status: RequestStatus,
    pub timestamp: DateTime<Utc>,
}
