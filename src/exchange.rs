//! Request lifecycle manager.
//!
//! Owns every rule about who may move a request, when a transaction is
//! produced, and when a review or a skill deletion is allowed. Storage only
//! guarantees that the writes it is asked for are conditional.

use std::sync::Arc;

use uuid::Uuid;

use crate::db::request::{ExchangeRequest, RequestView};
use crate::db::skill::{NewSkill, Skill, SkillFilter, SkillListing};
use crate::db::tx::{Review, Transaction, TransactionView};
use crate::db::user::{ProfileUpdate, User};
use crate::db::ExchangeRepository;
use crate::error::{ExchangeError, ExchangeResult};
use crate::lifecycle::{Rating, RequestAction, RequestStatus};
use crate::validation;

pub const MIN_REVIEW_COMMENT_LEN: usize = 10;

/// Result of a completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub transaction: Transaction,
    /// `false` when the request was already completed and the existing
    /// transaction is returned instead.
    pub created: bool,
}

/// Outcome of the generic status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Decided(RequestStatus),
    Completed(Completion),
}

pub struct ExchangeService {
    repo: Arc<dyn ExchangeRepository>,
}

impl ExchangeService {
    pub fn new(repo: Arc<dyn ExchangeRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_request(
        &self,
        requester_id: Uuid,
        skill_id: Uuid,
    ) -> ExchangeResult<ExchangeRequest> {
        let skill = self.load_skill(skill_id).await?;
        if skill.owner_id == requester_id {
            tracing::warn!("user {requester_id} tried to request their own skill {skill_id}");
            return Err(ExchangeError::not_permitted(
                "You cannot request your own skill",
            ));
        }

        let request = self.repo.create_request(requester_id, skill_id).await?;
        tracing::info!(
            "request {} created by {} for skill {}",
            request.id,
            requester_id,
            skill_id
        );
        Ok(request)
    }

    pub async fn accept(&self, request_id: Uuid, acting_user: Uuid) -> ExchangeResult<RequestStatus> {
        self.decide(request_id, acting_user, RequestAction::Accept).await
    }

    pub async fn reject(&self, request_id: Uuid, acting_user: Uuid) -> ExchangeResult<RequestStatus> {
        self.decide(request_id, acting_user, RequestAction::Reject).await
    }

    async fn decide(
        &self,
        request_id: Uuid,
        acting_user: Uuid,
        action: RequestAction,
    ) -> ExchangeResult<RequestStatus> {
        let request = self.load_request(request_id).await?;
        if request.skill_owner_id != acting_user {
            tracing::warn!("user {acting_user} may not {action} request {request_id}");
            return Err(ExchangeError::not_permitted(format!(
                "Only the skill owner can {action} this request"
            )));
        }

        let next = request.status.apply(action)?;
        if !self
            .repo
            .transition_request(request_id, request.status, next)
            .await?
        {
            return Err(ExchangeError::conflict(
                "Request was changed by another action, reload and try again",
            ));
        }

        tracing::info!("request {request_id} moved from {} to {next}", request.status);
        Ok(next)
    }

    /// Completes an accepted request and produces its transaction.
    ///
    /// Repeating the call on a completed request returns the transaction
    /// created the first time; no second one is ever written.
    pub async fn complete(&self, request_id: Uuid, acting_user: Uuid) -> ExchangeResult<Completion> {
        let request = self.load_request(request_id).await?;
        if !request.involves(acting_user) {
            tracing::warn!("user {acting_user} is not a party to request {request_id}");
            return Err(ExchangeError::not_permitted(
                "Only the requester or the skill owner can complete this request",
            ));
        }

        if request.status == RequestStatus::Completed {
            if let Some(transaction) = self.repo.find_transaction_by_request(request_id).await? {
                return Ok(Completion {
                    transaction,
                    created: false,
                });
            }
        }
        request.status.apply(RequestAction::Complete)?;

        match self.repo.complete_request(request_id).await? {
            Some(transaction) => {
                tracing::info!(
                    "request {request_id} completed, transaction {} created",
                    transaction.id
                );
                Ok(Completion {
                    transaction,
                    created: true,
                })
            }
            // someone else completed it between our read and write
            None => match self.repo.find_transaction_by_request(request_id).await? {
                Some(transaction) => Ok(Completion {
                    transaction,
                    created: false,
                }),
                None => Err(ExchangeError::conflict(
                    "Request was changed by another action, reload and try again",
                )),
            },
        }
    }

    /// Entry point of `/update-request`. `Completed` goes through
    /// [`complete`](Self::complete) so a transaction always exists for it.
    pub async fn update_status(
        &self,
        request_id: Uuid,
        acting_user: Uuid,
        status: &str,
    ) -> ExchangeResult<StatusChange> {
        match status.parse::<RequestStatus>()? {
            RequestStatus::Accepted => self
                .accept(request_id, acting_user)
                .await
                .map(StatusChange::Decided),
            RequestStatus::Rejected => self
                .reject(request_id, acting_user)
                .await
                .map(StatusChange::Decided),
            RequestStatus::Completed => self
                .complete(request_id, acting_user)
                .await
                .map(StatusChange::Completed),
            RequestStatus::Pending => Err(ExchangeError::not_permitted(
                "A request cannot be moved back to Pending",
            )),
        }
    }

    pub async fn submit_review(
        &self,
        transaction_id: Uuid,
        reviewer: Uuid,
        rating: i64,
        comments: &str,
    ) -> ExchangeResult<Review> {
        let rating = Rating::new(rating)?;
        let comments = validation::required_text("Comments", comments, MIN_REVIEW_COMMENT_LEN)?;

        let record = self
            .repo
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| ExchangeError::not_found("Transaction not found"))?;
        if !record.involves(reviewer) {
            return Err(ExchangeError::not_permitted(
                "Only a party to this transaction can review it",
            ));
        }
        if record.reviewed {
            return Err(already_reviewed());
        }

        let review = self
            .repo
            .insert_review(transaction_id, rating, &comments)
            .await?
            .ok_or_else(already_reviewed)?;
        tracing::info!("review {} stored for transaction {transaction_id}", review.id);
        Ok(review)
    }

    pub async fn create_skill(
        &self,
        owner_id: Uuid,
        name: &str,
        description: &str,
        category: &str,
    ) -> ExchangeResult<Skill> {
        let skill = NewSkill {
            name: validation::required_text("Skill name", name, 2)?,
            description: validation::required_text("Description", description, 10)?,
            category: validation::required_text("Category", category, 2)?,
        };
        let skill = self.repo.create_skill(owner_id, skill).await?;
        tracing::info!("skill {} created by {owner_id}", skill.id);
        Ok(skill)
    }

    /// Deletes a skill that no request references. Requests of every status
    /// count, including rejected and completed ones.
    pub async fn delete_skill(&self, skill_id: Uuid, acting_user: Uuid) -> ExchangeResult<()> {
        let skill = self.load_skill(skill_id).await?;
        if skill.owner_id != acting_user {
            tracing::warn!("user {acting_user} tried to delete skill {skill_id}");
            return Err(ExchangeError::not_permitted(
                "You can only delete your own skills",
            ));
        }

        let references = self.repo.count_requests_for_skill(skill_id).await?;
        if references > 0 {
            tracing::warn!("skill {skill_id} still has {references} request(s)");
            return Err(ExchangeError::conflict(
                "Cannot delete skill with associated requests",
            ));
        }

        if !self.repo.delete_skill(skill_id).await? {
            return Err(ExchangeError::not_found("Skill not found"));
        }
        tracing::info!("skill {skill_id} deleted");
        Ok(())
    }

    pub async fn list_skills(&self, filter: SkillFilter) -> ExchangeResult<Vec<SkillListing>> {
        self.repo.list_skills(filter).await
    }

    pub async fn sent_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
        self.repo.list_sent_requests(user_id).await
    }

    pub async fn received_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
        self.repo.list_received_requests(user_id).await
    }

    pub async fn transactions(
        &self,
        user_id: Uuid,
        acting_user: Uuid,
    ) -> ExchangeResult<Vec<TransactionView>> {
        ensure_self(user_id, acting_user)?;
        self.repo.list_transactions(user_id).await
    }

    pub async fn profile(&self, user_id: Uuid, acting_user: Uuid) -> ExchangeResult<User> {
        ensure_self(user_id, acting_user)?;
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| ExchangeError::not_found("User not found"))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        acting_user: Uuid,
        name: &str,
        phone: Option<&str>,
        location: Option<&str>,
        bio: &str,
    ) -> ExchangeResult<()> {
        ensure_self(user_id, acting_user)?;
        let update = ProfileUpdate {
            name: validation::required_text("Name", name, 2)?,
            phone: validation::check_phone(phone)?,
            location: validation::optional_text(location),
            bio: validation::required_text("Bio", bio, 10)?,
        };

        if !self.repo.update_profile(user_id, update).await? {
            return Err(ExchangeError::not_found("User not found"));
        }
        tracing::info!("profile updated for user {user_id}");
        Ok(())
    }

    async fn load_request(&self, id: Uuid) -> ExchangeResult<ExchangeRequest> {
        self.repo
            .get_request(id)
            .await?
            .ok_or_else(|| ExchangeError::not_found("Request not found"))
    }

    async fn load_skill(&self, id: Uuid) -> ExchangeResult<Skill> {
        self.repo
            .get_skill(id)
            .await?
            .ok_or_else(|| ExchangeError::not_found("Skill not found"))
    }
}

fn ensure_self(user_id: Uuid, acting_user: Uuid) -> ExchangeResult<()> {
    if user_id != acting_user {
        tracing::warn!("user {acting_user} tried to access data of {user_id}");
        return Err(ExchangeError::not_permitted("Unauthorized"));
    }
    Ok(())
}

fn already_reviewed() -> ExchangeError {
    ExchangeError::conflict("Review already submitted for this transaction")
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Barrier;

    use super::*;
    use crate::db::memory::MemoryRepository;
    use crate::db::tx::TransactionRecord;
    use crate::db::user::{Credentials, NewUser};

    struct Fixture {
        repo: Arc<MemoryRepository>,
        service: ExchangeService,
        owner: Uuid,
        learner: Uuid,
        outsider: Uuid,
        skill: Skill,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(MemoryRepository::new());
        let mut ids = Vec::new();
        for (name, email) in [
            ("Owner", "owner@example.com"),
            ("Learner", "learner@example.com"),
            ("Outsider", "outsider@example.com"),
        ] {
            let user = repo
                .create_user(NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: None,
                    location: None,
                    bio: String::new(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let service = ExchangeService::new(repo.clone());
        let skill = service
            .create_skill(ids[0], "Guitar", "Fingerstyle for beginners", "Music")
            .await
            .unwrap();
        Fixture {
            repo,
            service,
            owner: ids[0],
            learner: ids[1],
            outsider: ids[2],
            skill,
        }
    }

    const COMMENTS: &str = "Patient and clear instructor";

    #[tokio::test]
    async fn full_exchange_from_request_to_review() {
        let f = fixture().await;

        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.skill_owner_id, f.owner);

        let status = f.service.accept(request.id, f.owner).await.unwrap();
        assert_eq!(status, RequestStatus::Accepted);

        let completion = f.service.complete(request.id, f.learner).await.unwrap();
        assert!(completion.created);
        assert_eq!(completion.transaction.request_id, request.id);

        let review = f
            .service
            .submit_review(completion.transaction.id, f.learner, 4, COMMENTS)
            .await
            .unwrap();
        assert_eq!(review.rating, 4);

        let err = f
            .service
            .submit_review(completion.transaction.id, f.learner, 5, COMMENTS)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Conflict(_)));

        let history = f.service.transactions(f.owner, f.owner).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].has_review);
        assert_eq!(history[0].user_name, "Learner");
    }

    #[tokio::test]
    async fn completing_twice_keeps_a_single_transaction() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        f.service.accept(request.id, f.owner).await.unwrap();

        let first = f.service.complete(request.id, f.owner).await.unwrap();
        let second = f.service.complete(request.id, f.learner).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.transaction.id, second.transaction.id);
        assert_eq!(f.service.transactions(f.learner, f.learner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn completion_requires_an_accepted_request() {
        let f = fixture().await;
        let pending = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        let err = f.service.complete(pending.id, f.learner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));

        let rejected = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        f.service.reject(rejected.id, f.owner).await.unwrap();
        let err = f.service.complete(rejected.id, f.owner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));

        assert!(f.service.transactions(f.learner, f.learner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_the_owner_decides_and_only_once() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();

        for user in [f.learner, f.outsider] {
            let err = f.service.accept(request.id, user).await.unwrap_err();
            assert!(matches!(err, ExchangeError::NotPermitted(_)));
            let err = f.service.reject(request.id, user).await.unwrap_err();
            assert!(matches!(err, ExchangeError::NotPermitted(_)));
        }

        f.service.accept(request.id, f.owner).await.unwrap();
        let err = f.service.reject(request.id, f.owner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));
        let err = f.service.accept(request.id, f.owner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));
    }

    #[tokio::test]
    async fn outsiders_cannot_complete() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        f.service.accept(request.id, f.owner).await.unwrap();

        let err = f.service.complete(request.id, f.outsider).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));
    }

    #[tokio::test]
    async fn requesting_your_own_skill_fails() {
        let f = fixture().await;
        let err = f.service.create_request(f.owner, f.skill.id).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));

        let err = f.service.create_request(f.learner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(_)));
    }

    #[tokio::test]
    async fn skill_with_any_request_cannot_be_deleted() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        f.service.reject(request.id, f.owner).await.unwrap();

        let err = f.service.delete_skill(f.skill.id, f.owner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Conflict(_)));
        assert_eq!(err.to_string(), "Cannot delete skill with associated requests");
    }

    #[tokio::test]
    async fn unreferenced_skill_is_deleted_by_its_owner_only() {
        let f = fixture().await;
        let err = f.service.delete_skill(f.skill.id, f.learner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));

        f.service.delete_skill(f.skill.id, f.owner).await.unwrap();
        let err = f.service.delete_skill(f.skill.id, f.owner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(_)));
    }

    #[tokio::test]
    async fn review_rules() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        f.service.accept(request.id, f.owner).await.unwrap();
        let tx = f.service.complete(request.id, f.owner).await.unwrap().transaction;

        for rating in [0, 6] {
            let err = f.service.submit_review(tx.id, f.learner, rating, COMMENTS).await.unwrap_err();
            assert!(matches!(err, ExchangeError::Validation(_)));
        }
        let err = f.service.submit_review(tx.id, f.learner, 3, "meh").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Validation(_)));
        let err = f.service.submit_review(tx.id, f.outsider, 3, COMMENTS).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));
        let err = f
            .service
            .submit_review(Uuid::new_v4(), f.learner, 3, COMMENTS)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(_)));

        f.service.submit_review(tx.id, f.owner, 1, COMMENTS).await.unwrap();
    }

    #[tokio::test]
    async fn status_endpoint_dispatches_to_the_lifecycle() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();

        let err = f.service.update_status(request.id, f.owner, "Done").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Validation(_)));
        let err = f.service.update_status(request.id, f.owner, "Pending").await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));

        let change = f.service.update_status(request.id, f.owner, "Accepted").await.unwrap();
        assert_eq!(change, StatusChange::Decided(RequestStatus::Accepted));

        match f.service.update_status(request.id, f.learner, "Completed").await.unwrap() {
            StatusChange::Completed(completion) => assert!(completion.created),
            other => panic!("unexpected change: {other:?}"),
        }
    }

    #[tokio::test]
    async fn profiles_are_private_and_validated() {
        let f = fixture().await;
        let err = f.service.profile(f.owner, f.learner).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotPermitted(_)));

        let err = f
            .service
            .update_profile(f.owner, f.owner, "O", None, None, "Long enough bio")
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Validation(_)));

        f.service
            .update_profile(f.owner, f.owner, " Owen ", Some("555 0101"), Some(" "), "Teaches guitar on weekends")
            .await
            .unwrap();
        let profile = f.service.profile(f.owner, f.owner).await.unwrap();
        assert_eq!(profile.name, "Owen");
        assert_eq!(profile.phone.as_deref(), Some("555 0101"));
        assert_eq!(profile.location, None);
    }

    /// Releases `get_request` callers in pairs, so two concurrent calls both
    /// read the request before either of them writes.
    struct Lockstep {
        inner: Arc<MemoryRepository>,
        barrier: Barrier,
    }

    impl Lockstep {
        fn new(inner: Arc<MemoryRepository>) -> Self {
            Self {
                inner,
                barrier: Barrier::new(2),
            }
        }
    }

    #[async_trait]
    impl ExchangeRepository for Lockstep {
        async fn create_user(&self, user: NewUser) -> ExchangeResult<User> {
            self.inner.create_user(user).await
        }

        async fn find_credentials(&self, email: &str) -> ExchangeResult<Option<Credentials>> {
            self.inner.find_credentials(email).await
        }

        async fn get_user(&self, id: Uuid) -> ExchangeResult<Option<User>> {
            self.inner.get_user(id).await
        }

        async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> ExchangeResult<bool> {
            self.inner.update_profile(id, update).await
        }

        async fn create_skill(&self, owner_id: Uuid, skill: NewSkill) -> ExchangeResult<Skill> {
            self.inner.create_skill(owner_id, skill).await
        }

        async fn get_skill(&self, id: Uuid) -> ExchangeResult<Option<Skill>> {
            self.inner.get_skill(id).await
        }

        async fn list_skills(&self, filter: SkillFilter) -> ExchangeResult<Vec<SkillListing>> {
            self.inner.list_skills(filter).await
        }

        async fn count_requests_for_skill(&self, skill_id: Uuid) -> ExchangeResult<i64> {
            self.inner.count_requests_for_skill(skill_id).await
        }

        async fn delete_skill(&self, id: Uuid) -> ExchangeResult<bool> {
            self.inner.delete_skill(id).await
        }

        async fn create_request(
            &self,
            requester_id: Uuid,
            skill_id: Uuid,
        ) -> ExchangeResult<ExchangeRequest> {
            self.inner.create_request(requester_id, skill_id).await
        }

        async fn get_request(&self, id: Uuid) -> ExchangeResult<Option<ExchangeRequest>> {
            let request = self.inner.get_request(id).await?;
            self.barrier.wait().await;
            Ok(request)
        }

        async fn transition_request(
            &self,
            id: Uuid,
            from: RequestStatus,
            to: RequestStatus,
        ) -> ExchangeResult<bool> {
            self.inner.transition_request(id, from, to).await
        }

        async fn complete_request(&self, id: Uuid) -> ExchangeResult<Option<Transaction>> {
            self.inner.complete_request(id).await
        }

        async fn list_sent_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
            self.inner.list_sent_requests(user_id).await
        }

        async fn list_received_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
            self.inner.list_received_requests(user_id).await
        }

        async fn find_transaction_by_request(
            &self,
            request_id: Uuid,
        ) -> ExchangeResult<Option<Transaction>> {
            self.inner.find_transaction_by_request(request_id).await
        }

        async fn get_transaction(&self, id: Uuid) -> ExchangeResult<Option<TransactionRecord>> {
            self.inner.get_transaction(id).await
        }

        async fn list_transactions(&self, user_id: Uuid) -> ExchangeResult<Vec<TransactionView>> {
            self.inner.list_transactions(user_id).await
        }

        async fn insert_review(
            &self,
            transaction_id: Uuid,
            rating: Rating,
            comments: &str,
        ) -> ExchangeResult<Option<Review>> {
            self.inner.insert_review(transaction_id, rating, comments).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn racing_completions_share_one_transaction() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();
        f.service.accept(request.id, f.owner).await.unwrap();

        let racing = ExchangeService::new(Arc::new(Lockstep::new(f.repo.clone())));
        let (by_learner, by_owner) = tokio::join!(
            racing.complete(request.id, f.learner),
            racing.complete(request.id, f.owner),
        );
        let (by_learner, by_owner) = (by_learner.unwrap(), by_owner.unwrap());

        assert_eq!(by_learner.transaction.id, by_owner.transaction.id);
        assert!(by_learner.created ^ by_owner.created);
        assert_eq!(f.service.transactions(f.learner, f.learner).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn accept_and_reject_race_has_one_winner() {
        let f = fixture().await;
        let request = f.service.create_request(f.learner, f.skill.id).await.unwrap();

        let racing = ExchangeService::new(Arc::new(Lockstep::new(f.repo.clone())));
        let (accepted, rejected) = tokio::join!(
            racing.accept(request.id, f.owner),
            racing.reject(request.id, f.owner),
        );

        let winner = match (accepted, rejected) {
            (Ok(status), Err(err)) | (Err(err), Ok(status)) => {
                assert!(matches!(err, ExchangeError::Conflict(_)));
                status
            }
            other => panic!("expected exactly one winner, got {other:?}"),
        };
        let stored = f.repo.get_request(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, winner);
    }
}
