use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ExchangeResult;
use crate::lifecycle::{Rating, RequestStatus};

pub mod memory;
pub mod pg;
pub mod request;
pub mod skill;
pub mod tx;
pub mod user;

use request::{ExchangeRequest, RequestView};
use skill::{NewSkill, Skill, SkillFilter, SkillListing};
use tx::{Review, Transaction, TransactionRecord, TransactionView};
use user::{Credentials, NewUser, ProfileUpdate, User};

/// Storage seam for the marketplace.
///
/// Implementations must make the lifecycle writes conditional:
/// [`transition_request`](Self::transition_request) and
/// [`complete_request`](Self::complete_request) only succeed when the stored
/// status still matches, and [`insert_review`](Self::insert_review) only
/// succeeds for a transaction without a review.
#[async_trait]
pub trait ExchangeRepository: Send + Sync {
    /// Fails with a conflict when the email is already registered.
    async fn create_user(&self, user: NewUser) -> ExchangeResult<User>;
    async fn find_credentials(&self, email: &str) -> ExchangeResult<Option<Credentials>>;
    async fn get_user(&self, id: Uuid) -> ExchangeResult<Option<User>>;
    /// Returns `false` when no such user exists.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> ExchangeResult<bool>;

    async fn create_skill(&self, owner_id: Uuid, skill: NewSkill) -> ExchangeResult<Skill>;
    async fn get_skill(&self, id: Uuid) -> ExchangeResult<Option<Skill>>;
    async fn list_skills(&self, filter: SkillFilter) -> ExchangeResult<Vec<SkillListing>>;
    /// Requests of any status that reference the skill.
    async fn count_requests_for_skill(&self, skill_id: Uuid) -> ExchangeResult<i64>;
    /// Fails with a conflict if a request references the skill.
    async fn delete_skill(&self, id: Uuid) -> ExchangeResult<bool>;

    async fn create_request(
        &self,
        requester_id: Uuid,
        skill_id: Uuid,
    ) -> ExchangeResult<ExchangeRequest>;
    async fn get_request(&self, id: Uuid) -> ExchangeResult<Option<ExchangeRequest>>;
    /// Compare-and-set on the status. `false` means the request was not in `from`.
    async fn transition_request(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> ExchangeResult<bool>;
    /// Moves an `Accepted` request to `Completed` and inserts its transaction
    /// as one unit. `None` means the request was not `Accepted`; nothing was written.
    async fn complete_request(&self, id: Uuid) -> ExchangeResult<Option<Transaction>>;
    async fn list_sent_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>>;
    async fn list_received_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>>;

    async fn find_transaction_by_request(
        &self,
        request_id: Uuid,
    ) -> ExchangeResult<Option<Transaction>>;
    async fn get_transaction(&self, id: Uuid) -> ExchangeResult<Option<TransactionRecord>>;
    async fn list_transactions(&self, user_id: Uuid) -> ExchangeResult<Vec<TransactionView>>;
    /// `None` when the transaction already carries a review.
    async fn insert_review(
        &self,
        transaction_id: Uuid,
        rating: Rating,
        comments: &str,
    ) -> ExchangeResult<Option<Review>>;
}
