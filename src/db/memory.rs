//! Process-local repository.
//!
//! Used when no `DATABASE_URL` is configured and by the test suites. Every
//! call takes the single table lock, so the conditional writes are atomic
//! with respect to each other.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::request::{ExchangeRequest, RequestView};
use super::skill::{NewSkill, Skill, SkillFilter, SkillListing};
use super::tx::{Review, Transaction, TransactionRecord, TransactionView, COMPLETED};
use super::user::{Credentials, NewUser, ProfileUpdate, User};
use super::ExchangeRepository;
use crate::error::{ExchangeError, ExchangeResult};
use crate::lifecycle::{Rating, RequestStatus};

#[derive(Debug, Clone)]
struct StoredRequest {
    id: Uuid,
    requester_id: Uuid,
    skill_id: Uuid,
    status: RequestStatus,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    passwords: HashMap<Uuid, String>,
    // insertion order doubles as creation order for listings
    skills: Vec<Skill>,
    requests: Vec<StoredRequest>,
    transactions: Vec<Transaction>,
    reviews: Vec<Review>,
}

impl Tables {
    fn skill(&self, id: Uuid) -> Option<&Skill> {
        self.skills.iter().find(|skill| skill.id == id)
    }

    fn user_name(&self, id: Uuid) -> String {
        self.users
            .get(&id)
            .map(|user| user.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn resolve(&self, stored: &StoredRequest) -> Option<ExchangeRequest> {
        let skill = self.skill(stored.skill_id)?;
        Some(ExchangeRequest {
            id: stored.id,
            requester_id: stored.requester_id,
            skill_id: stored.skill_id,
            skill_owner_id: skill.owner_id,
            status: stored.status,
            created_at: stored.created_at,
        })
    }

    fn request_view(&self, stored: &StoredRequest, counterparty: Uuid) -> Option<RequestView> {
        let skill = self.skill(stored.skill_id)?;
        Some(RequestView {
            request_id: stored.id,
            user_id: stored.requester_id,
            user_name: self.user_name(counterparty),
            skill_id: skill.id,
            skill_name: skill.name.clone(),
            status: stored.status,
            timestamp: stored.created_at,
        })
    }

    fn has_review(&self, transaction_id: Uuid) -> bool {
        self.reviews
            .iter()
            .any(|review| review.transaction_id == transaction_id)
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExchangeRepository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> ExchangeResult<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(ExchangeError::conflict("Email is already registered"));
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            location: user.location,
            bio: user.bio,
            joined_at: Utc::now(),
        };
        tables.passwords.insert(created.id, user.password_hash);
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_credentials(&self, email: &str) -> ExchangeResult<Option<Credentials>> {
        let tables = self.tables.lock().await;
        let credentials = tables
            .users
            .values()
            .find(|user| user.email == email)
            .and_then(|user| {
                tables.passwords.get(&user.id).map(|hash| Credentials {
                    user_id: user.id,
                    password_hash: hash.clone(),
                })
            });
        Ok(credentials)
    }

    async fn get_user(&self, id: Uuid) -> ExchangeResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> ExchangeResult<bool> {
        let mut tables = self.tables.lock().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        user.name = update.name;
        user.phone = update.phone;
        user.location = update.location;
        user.bio = update.bio;
        Ok(true)
    }

    async fn create_skill(&self, owner_id: Uuid, skill: NewSkill) -> ExchangeResult<Skill> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(ExchangeError::not_found("User not found"));
        }
        let created = Skill {
            id: Uuid::new_v4(),
            name: skill.name,
            description: skill.description,
            category: skill.category,
            owner_id,
            created_at: Utc::now(),
        };
        tables.skills.push(created.clone());
        Ok(created)
    }

    async fn get_skill(&self, id: Uuid) -> ExchangeResult<Option<Skill>> {
        Ok(self.tables.lock().await.skill(id).cloned())
    }

    async fn list_skills(&self, filter: SkillFilter) -> ExchangeResult<Vec<SkillListing>> {
        let tables = self.tables.lock().await;
        let listings = tables
            .skills
            .iter()
            .rev()
            .filter(|skill| match filter {
                SkillFilter::All => true,
                SkillFilter::OwnedBy(owner) => skill.owner_id == owner,
                SkillFilter::NotOwnedBy(viewer) => skill.owner_id != viewer,
            })
            .map(|skill| SkillListing {
                skill_id: skill.id,
                skill_name: skill.name.clone(),
                description: skill.description.clone(),
                category: skill.category.clone(),
                user_id: skill.owner_id,
                user_name: match filter {
                    SkillFilter::OwnedBy(_) => None,
                    _ => Some(tables.user_name(skill.owner_id)),
                },
            })
            .collect();
        Ok(listings)
    }

    async fn count_requests_for_skill(&self, skill_id: Uuid) -> ExchangeResult<i64> {
        let tables = self.tables.lock().await;
        let count = tables
            .requests
            .iter()
            .filter(|request| request.skill_id == skill_id)
            .count();
        Ok(count as i64)
    }

    async fn delete_skill(&self, id: Uuid) -> ExchangeResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.requests.iter().any(|request| request.skill_id == id) {
            return Err(ExchangeError::conflict(
                "Cannot delete skill with associated requests",
            ));
        }
        let before = tables.skills.len();
        tables.skills.retain(|skill| skill.id != id);
        Ok(tables.skills.len() < before)
    }

    async fn create_request(
        &self,
        requester_id: Uuid,
        skill_id: Uuid,
    ) -> ExchangeResult<ExchangeRequest> {
        let mut tables = self.tables.lock().await;
        if tables.skill(skill_id).is_none() {
            return Err(ExchangeError::not_found("Skill not found"));
        }
        let stored = StoredRequest {
            id: Uuid::new_v4(),
            requester_id,
            skill_id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        let resolved = tables
            .resolve(&stored)
            .ok_or_else(|| ExchangeError::not_found("Skill not found"))?;
        tables.requests.push(stored);
        Ok(resolved)
    }

    async fn get_request(&self, id: Uuid) -> ExchangeResult<Option<ExchangeRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .requests
            .iter()
            .find(|request| request.id == id)
            .and_then(|request| tables.resolve(request)))
    }

    async fn transition_request(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> ExchangeResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables
            .requests
            .iter_mut()
            .find(|request| request.id == id && request.status == from)
        {
            Some(request) => {
                request.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_request(&self, id: Uuid) -> ExchangeResult<Option<Transaction>> {
        let mut tables = self.tables.lock().await;
        let Some(request) = tables
            .requests
            .iter_mut()
            .find(|request| request.id == id && request.status == RequestStatus::Accepted)
        else {
            return Ok(None);
        };
        request.status = RequestStatus::Completed;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            request_id: id,
            completed_at: Utc::now(),
            status: COMPLETED.to_string(),
        };
        tables.transactions.push(transaction.clone());
        Ok(Some(transaction))
    }

    async fn list_sent_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
        let tables = self.tables.lock().await;
        let views = tables
            .requests
            .iter()
            .rev()
            .filter(|request| request.requester_id == user_id)
            .filter_map(|request| {
                let owner = tables.skill(request.skill_id)?.owner_id;
                tables.request_view(request, owner)
            })
            .collect();
        Ok(views)
    }

    async fn list_received_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
        let tables = self.tables.lock().await;
        let views = tables
            .requests
            .iter()
            .rev()
            .filter(|request| {
                tables
                    .skill(request.skill_id)
                    .is_some_and(|skill| skill.owner_id == user_id)
            })
            .filter_map(|request| tables.request_view(request, request.requester_id))
            .collect();
        Ok(views)
    }

    async fn find_transaction_by_request(
        &self,
        request_id: Uuid,
    ) -> ExchangeResult<Option<Transaction>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transactions
            .iter()
            .find(|transaction| transaction.request_id == request_id)
            .cloned())
    }

    async fn get_transaction(&self, id: Uuid) -> ExchangeResult<Option<TransactionRecord>> {
        let tables = self.tables.lock().await;
        let Some(transaction) = tables.transactions.iter().find(|t| t.id == id) else {
            return Ok(None);
        };
        let request = tables
            .requests
            .iter()
            .find(|request| request.id == transaction.request_id)
            .and_then(|request| tables.resolve(request));

        Ok(request.map(|request| TransactionRecord {
            id: transaction.id,
            requester_id: request.requester_id,
            provider_id: request.skill_owner_id,
            reviewed: tables.has_review(transaction.id),
        }))
    }

    async fn list_transactions(&self, user_id: Uuid) -> ExchangeResult<Vec<TransactionView>> {
        let tables = self.tables.lock().await;
        let views = tables
            .transactions
            .iter()
            .rev()
            .filter_map(|transaction| {
                let stored = tables
                    .requests
                    .iter()
                    .find(|request| request.id == transaction.request_id)?;
                let request = tables.resolve(stored)?;
                if !request.involves(user_id) {
                    return None;
                }
                let counterparty = if request.requester_id == user_id {
                    request.skill_owner_id
                } else {
                    request.requester_id
                };
                let skill_name = tables.skill(request.skill_id)?.name.clone();
                Some(TransactionView {
                    transaction_id: transaction.id,
                    request_id: request.id,
                    skill_name,
                    user_name: tables.user_name(counterparty),
                    completion_date: transaction.completed_at,
                    status: transaction.status.clone(),
                    has_review: tables.has_review(transaction.id),
                })
            })
            .collect();
        Ok(views)
    }

    async fn insert_review(
        &self,
        transaction_id: Uuid,
        rating: Rating,
        comments: &str,
    ) -> ExchangeResult<Option<Review>> {
        let mut tables = self.tables.lock().await;
        if tables.has_review(transaction_id) {
            return Ok(None);
        }
        if !tables.transactions.iter().any(|t| t.id == transaction_id) {
            return Err(ExchangeError::not_found("Transaction not found"));
        }
        let review = Review {
            id: Uuid::new_v4(),
            transaction_id,
            rating: rating.get(),
            comments: comments.to_string(),
            created_at: Utc::now(),
        };
        tables.reviews.push(review.clone());
        Ok(Some(review))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryRepository, Uuid, Uuid, Skill) {
        let repo = MemoryRepository::new();
        let owner = repo.create_user(new_user("Ada", "ada@example.com")).await.unwrap();
        let learner = repo.create_user(new_user("Bo", "bo@example.com")).await.unwrap();
        let skill = repo
            .create_skill(
                owner.id,
                NewSkill {
                    name: "Pottery".to_string(),
                    description: "Wheel throwing basics".to_string(),
                    category: "Craft".to_string(),
                },
            )
            .await
            .unwrap();
        (repo, owner.id, learner.id, skill)
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            location: None,
            bio: String::new(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (repo, ..) = seeded().await;
        let err = repo.create_user(new_user("Other", "ada@example.com")).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Conflict(_)));
    }

    #[tokio::test]
    async fn complete_only_switches_accepted_requests_once() {
        let (repo, _, learner, skill) = seeded().await;
        let request = repo.create_request(learner, skill.id).await.unwrap();

        assert!(repo.complete_request(request.id).await.unwrap().is_none());

        assert!(repo
            .transition_request(request.id, RequestStatus::Pending, RequestStatus::Accepted)
            .await
            .unwrap());
        let first = repo.complete_request(request.id).await.unwrap();
        let second = repo.complete_request(request.id).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let stored = repo.get_request(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        let (repo, _, learner, skill) = seeded().await;
        let request = repo.create_request(learner, skill.id).await.unwrap();

        assert!(!repo
            .transition_request(request.id, RequestStatus::Accepted, RequestStatus::Completed)
            .await
            .unwrap());
        assert!(repo
            .transition_request(request.id, RequestStatus::Pending, RequestStatus::Rejected)
            .await
            .unwrap());
        assert!(!repo
            .transition_request(request.id, RequestStatus::Pending, RequestStatus::Accepted)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn referenced_skill_cannot_be_deleted() {
        let (repo, _, learner, skill) = seeded().await;
        repo.create_request(learner, skill.id).await.unwrap();

        assert_eq!(repo.count_requests_for_skill(skill.id).await.unwrap(), 1);
        let err = repo.delete_skill(skill.id).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Conflict(_)));
        assert!(repo.get_skill(skill.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn listings_name_the_other_party() {
        let (repo, owner, learner, skill) = seeded().await;
        repo.create_request(learner, skill.id).await.unwrap();

        let sent = repo.list_sent_requests(learner).await.unwrap();
        let received = repo.list_received_requests(owner).await.unwrap();
        assert_eq!(sent[0].user_name, "Ada");
        assert_eq!(received[0].user_name, "Bo");
        assert_eq!(received[0].user_id, learner);

        let browse = repo.list_skills(SkillFilter::NotOwnedBy(learner)).await.unwrap();
        assert_eq!(browse.len(), 1);
        assert_eq!(browse[0].user_name.as_deref(), Some("Ada"));
        let own = repo.list_skills(SkillFilter::OwnedBy(owner)).await.unwrap();
        assert_eq!(own[0].user_name, None);
        assert!(repo.list_skills(SkillFilter::OwnedBy(learner)).await.unwrap().is_empty());
    }
}
