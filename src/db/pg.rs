use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::request::{ExchangeRequest, RequestView};
use super::skill::{NewSkill, Skill, SkillFilter, SkillListing};
use super::tx::{Review, Transaction, TransactionRecord, TransactionView};
use super::user::{Credentials, NewUser, ProfileUpdate, User};
use super::ExchangeRepository;
use crate::error::{ExchangeError, ExchangeResult};
use crate::lifecycle::{Rating, RequestStatus};

const REQUEST_COLUMNS: &str = r#"
    SELECT r.id, r.requester_id, r.skill_id, s.owner_id AS skill_owner_id, r.status, r.created_at
    FROM requests r
    JOIN skills s ON s.id = r.skill_id
"#;

// Database repository
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

// skills.owner_id points at a user that does not exist
fn missing_owner(err: sqlx::Error) -> ExchangeError {
    if is_foreign_key_violation(&err) {
        ExchangeError::not_found("User not found")
    } else {
        err.into()
    }
}

#[async_trait]
impl ExchangeRepository for PgRepository {
    async fn create_user(&self, user: NewUser) -> ExchangeResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, phone, location, bio, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, phone, location, bio, joined_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.location)
        .bind(&user.bio)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ExchangeError::conflict("Email is already registered")
            } else {
                err.into()
            }
        })
    }

    async fn find_credentials(&self, email: &str) -> ExchangeResult<Option<Credentials>> {
        let credentials = sqlx::query_as::<_, Credentials>(
            r#"
            SELECT id AS user_id, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    async fn get_user(&self, id: Uuid) -> ExchangeResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, location, bio, joined_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> ExchangeResult<bool> {
        let mut query_builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        query_builder
            .push("name = ")
            .push_bind(&update.name)
            .push(", phone = ")
            .push_bind(&update.phone)
            .push(", location = ")
            .push_bind(&update.location)
            .push(", bio = ")
            .push_bind(&update.bio)
            .push(" WHERE id = ")
            .push_bind(id);

        let result = query_builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_skill(&self, owner_id: Uuid, skill: NewSkill) -> ExchangeResult<Skill> {
        let skill = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (name, description, category, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, category, owner_id, created_at
            "#,
        )
        .bind(&skill.name)
        .bind(&skill.description)
        .bind(&skill.category)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_owner)?;
        Ok(skill)
    }

    async fn get_skill(&self, id: Uuid) -> ExchangeResult<Option<Skill>> {
        let skill = sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, description, category, owner_id, created_at
            FROM skills
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(skill)
    }

    async fn list_skills(&self, filter: SkillFilter) -> ExchangeResult<Vec<SkillListing>> {
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "SELECT s.id AS skill_id, s.name AS skill_name, s.description, s.category, s.owner_id AS user_id, ",
        );
        match filter {
            SkillFilter::OwnedBy(owner) => {
                query_builder
                    .push("NULL::TEXT AS user_name FROM skills s WHERE s.owner_id = ")
                    .push_bind(owner);
            }
            SkillFilter::NotOwnedBy(viewer) => {
                query_builder
                    .push("u.name AS user_name FROM skills s JOIN users u ON u.id = s.owner_id WHERE s.owner_id <> ")
                    .push_bind(viewer);
            }
            SkillFilter::All => {
                query_builder.push("u.name AS user_name FROM skills s JOIN users u ON u.id = s.owner_id");
            }
        }
        query_builder.push(" ORDER BY s.created_at DESC");

        let skills = query_builder
            .build_query_as::<SkillListing>()
            .fetch_all(&self.pool)
            .await?;
        Ok(skills)
    }

    async fn count_requests_for_skill(&self, skill_id: Uuid) -> ExchangeResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM requests WHERE skill_id = $1")
            .bind(skill_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_skill(&self, id: Uuid) -> ExchangeResult<bool> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                // a request slipped in between the count and the delete
                if is_foreign_key_violation(&err) {
                    ExchangeError::conflict("Cannot delete skill with associated requests")
                } else {
                    err.into()
                }
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_request(
        &self,
        requester_id: Uuid,
        skill_id: Uuid,
    ) -> ExchangeResult<ExchangeRequest> {
        sqlx::query_as::<_, ExchangeRequest>(
            r#"
            WITH inserted AS (
                INSERT INTO requests (requester_id, skill_id)
                VALUES ($1, $2)
                RETURNING id, requester_id, skill_id, status, created_at
            )
            SELECT i.id, i.requester_id, i.skill_id, s.owner_id AS skill_owner_id, i.status, i.created_at
            FROM inserted i
            JOIN skills s ON s.id = i.skill_id
            "#,
        )
        .bind(requester_id)
        .bind(skill_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                ExchangeError::not_found("Skill not found")
            } else {
                err.into()
            }
        })
    }

    async fn get_request(&self, id: Uuid) -> ExchangeResult<Option<ExchangeRequest>> {
        let mut query_builder = QueryBuilder::<Postgres>::new(REQUEST_COLUMNS);
        query_builder.push(" WHERE r.id = ").push_bind(id);

        let request = query_builder
            .build_query_as::<ExchangeRequest>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn transition_request(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> ExchangeResult<bool> {
        let result = sqlx::query("UPDATE requests SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to)
            .bind(id)
            .bind(from)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn complete_request(&self, id: Uuid) -> ExchangeResult<Option<Transaction>> {
        let mut tx = self.pool.begin().await?;

        let switched = sqlx::query("UPDATE requests SET status = $1 WHERE id = $2 AND status = $3")
            .bind(RequestStatus::Completed)
            .bind(id)
            .bind(RequestStatus::Accepted)
            .execute(&mut *tx)
            .await?;

        if switched.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (request_id)
            VALUES ($1)
            RETURNING id, request_id, completed_at, status
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(transaction))
    }

    async fn list_sent_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
        let requests = sqlx::query_as::<_, RequestView>(
            r#"
            SELECT r.id AS request_id, r.requester_id AS user_id, owner.name AS user_name,
                   s.id AS skill_id, s.name AS skill_name, r.status, r.created_at AS "timestamp"
            FROM requests r
            JOIN skills s ON s.id = r.skill_id
            JOIN users owner ON owner.id = s.owner_id
            WHERE r.requester_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn list_received_requests(&self, user_id: Uuid) -> ExchangeResult<Vec<RequestView>> {
        let requests = sqlx::query_as::<_, RequestView>(
            r#"
            SELECT r.id AS request_id, r.requester_id AS user_id, requester.name AS user_name,
                   s.id AS skill_id, s.name AS skill_name, r.status, r.created_at AS "timestamp"
            FROM requests r
            JOIN skills s ON s.id = r.skill_id
            JOIN users requester ON requester.id = r.requester_id
            WHERE s.owner_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn find_transaction_by_request(
        &self,
        request_id: Uuid,
    ) -> ExchangeResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, request_id, completed_at, status
            FROM transactions
            WHERE request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(transaction)
    }

    async fn get_transaction(&self, id: Uuid) -> ExchangeResult<Option<TransactionRecord>> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT t.id, r.requester_id, s.owner_id AS provider_id,
                   EXISTS (SELECT 1 FROM reviews rv WHERE rv.transaction_id = t.id) AS reviewed
            FROM transactions t
            JOIN requests r ON r.id = t.request_id
            JOIN skills s ON s.id = r.skill_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_transactions(&self, user_id: Uuid) -> ExchangeResult<Vec<TransactionView>> {
        let transactions = sqlx::query_as::<_, TransactionView>(
            r#"
            SELECT t.id AS transaction_id, t.request_id, s.name AS skill_name,
                   CASE WHEN r.requester_id = $1 THEN provider.name ELSE requester.name END AS user_name,
                   t.completed_at AS completion_date, t.status,
                   EXISTS (SELECT 1 FROM reviews rv WHERE rv.transaction_id = t.id) AS has_review
            FROM transactions t
            JOIN requests r ON r.id = t.request_id
            JOIN skills s ON s.id = r.skill_id
            JOIN users requester ON requester.id = r.requester_id
            JOIN users provider ON provider.id = s.owner_id
            WHERE r.requester_id = $1 OR s.owner_id = $1
            ORDER BY t.completed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    async fn insert_review(
        &self,
        transaction_id: Uuid,
        rating: Rating,
        comments: &str,
    ) -> ExchangeResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (transaction_id, rating, comments)
            VALUES ($1, $2, $3)
            ON CONFLICT (transaction_id) DO NOTHING
            RETURNING id, transaction_id, rating, comments, created_at
            "#,
        )
        .bind(transaction_id)
        .bind(rating.get())
        .bind(comments)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }
}
