use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const COMPLETED: &str = "Completed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "transactionId")]
    pub id: Uuid,
    pub request_id: Uuid,
    #[serde(rename = "completionDate")]
    pub completed_at: DateTime<Utc>,
    pub status: String,
}

/// A transaction with both parties resolved, used for review checks.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub provider_id: Uuid,
    pub reviewed: bool,
}

impl TransactionRecord {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.requester_id == user_id || self.provider_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub transaction_id: Uuid,
    pub request_id: Uuid,
    pub skill_name: String,
    pub user_name: String,
    pub completion_date: DateTime<Utc>,
    pub status: String,
    pub has_review: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "reviewId")]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub rating: i16,
    pub comments: String,
    pub created_at: DateTime<Utc>,
}
