//! Typed wrapper over the REST API for a front end.
//!
//! Every call is one round trip; nothing is cached beyond the session. Calls
//! that move a request or review a transaction are serialized per entity
//! through [`InFlight`].

use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::db::request::RequestView;
use crate::db::skill::SkillListing;
use crate::db::tx::TransactionView;
use crate::db::user::User;
use crate::error::ErrorBody;
use crate::types::{
    Ack, AuthResponse, CompleteRequest, CompletionResponse, CreateRequest, CreateSkill,
    RegisterResponse, RequestCreated, SkillCreated, SubmitReview, UpdateProfile, UpdateRequest,
};

pub mod inflight;
pub mod session;

pub use inflight::{InFlight, InFlightGuard};
pub use session::{Session, SessionStore};

/// Every client failure: a readable message, plus the HTTP status when the
/// server answered.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("session storage error: {err}"))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("malformed data: {err}"))
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterForm<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub location: Option<&'a str>,
    pub bio: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginForm<'a> {
    email: &'a str,
    password: &'a str,
}

/// What the dashboard screen shows after mount.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub profile: User,
    pub skills: Vec<SkillListing>,
    pub sent: Vec<RequestView>,
    pub received: Vec<RequestView>,
}

pub struct ExchangeClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    in_flight: InFlight,
}

impl ExchangeClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            in_flight: InFlight::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    pub async fn current_user(&self) -> Result<Option<Uuid>, ApiError> {
        Ok(self.session.load().await?.map(|session| session.user_id))
    }

    pub async fn register(&self, form: &RegisterForm<'_>) -> Result<Uuid, ApiError> {
        let response: RegisterResponse = self
            .send(self.http.post(self.url("/register")).json(form))
            .await?;
        Ok(response.user_id)
    }

    /// Signs in and persists the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Uuid, ApiError> {
        let response: AuthResponse = self
            .send(self.http.post(self.url("/login")).json(&LoginForm { email, password }))
            .await?;
        self.session
            .save(&Session {
                user_id: response.user_id,
                access_token: response.access_token,
            })
            .await?;
        Ok(response.user_id)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.clear().await
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let session = self.require_session().await?;
        let path = format!("/user/{}", session.user_id);
        self.send(self.authed(Method::GET, &path, &session)).await
    }

    pub async fn update_profile(&self, update: &UpdateProfile) -> Result<Ack, ApiError> {
        let session = self.require_session().await?;
        let path = format!("/user/{}", session.user_id);
        self.send(self.authed(Method::PUT, &path, &session).json(update))
            .await
    }

    pub async fn own_skills(&self) -> Result<Vec<SkillListing>, ApiError> {
        let session = self.require_session().await?;
        let path = format!("/skills?userId={}&ownSkills=true", session.user_id);
        self.send(self.http.get(self.url(&path))).await
    }

    /// Everyone else's skills when signed in, all skills otherwise.
    pub async fn browse_skills(&self) -> Result<Vec<SkillListing>, ApiError> {
        let path = match self.session.load().await? {
            Some(session) => format!("/skills?userId={}", session.user_id),
            None => "/skills".to_string(),
        };
        self.send(self.http.get(self.url(&path))).await
    }

    pub async fn create_skill(&self, skill: &CreateSkill) -> Result<Uuid, ApiError> {
        let session = self.require_session().await?;
        let created: SkillCreated = self
            .send(self.authed(Method::POST, "/create-skill", &session).json(skill))
            .await?;
        Ok(created.skill_id)
    }

    pub async fn delete_skill(&self, skill_id: Uuid) -> Result<Ack, ApiError> {
        let _guard = self.guard(format!("skill:{skill_id}"))?;
        let session = self.require_session().await?;
        let path = format!("/skill/{skill_id}");
        self.send(self.authed(Method::DELETE, &path, &session)).await
    }

    pub async fn create_request(&self, skill_id: Uuid) -> Result<Uuid, ApiError> {
        let _guard = self.guard(format!("skill-request:{skill_id}"))?;
        let session = self.require_session().await?;
        let created: RequestCreated = self
            .send(
                self.authed(Method::POST, "/create-request", &session)
                    .json(&CreateRequest { skill_id }),
            )
            .await?;
        Ok(created.request_id)
    }

    pub async fn sent_requests(&self) -> Result<Vec<RequestView>, ApiError> {
        let session = self.require_session().await?;
        self.send(self.authed(Method::GET, "/requests", &session)).await
    }

    pub async fn received_requests(&self) -> Result<Vec<RequestView>, ApiError> {
        let session = self.require_session().await?;
        self.send(self.authed(Method::GET, "/received-requests", &session))
            .await
    }

    pub async fn accept(&self, request_id: Uuid) -> Result<Ack, ApiError> {
        self.update_request(request_id, "Accepted").await
    }

    pub async fn reject(&self, request_id: Uuid) -> Result<Ack, ApiError> {
        self.update_request(request_id, "Rejected").await
    }

    async fn update_request(&self, request_id: Uuid, status: &str) -> Result<Ack, ApiError> {
        let _guard = self.guard(request_key(request_id))?;
        let session = self.require_session().await?;
        let body = UpdateRequest {
            request_id,
            status: status.to_string(),
        };
        self.send(self.authed(Method::POST, "/update-request", &session).json(&body))
            .await
    }

    pub async fn complete(&self, request_id: Uuid) -> Result<CompletionResponse, ApiError> {
        let _guard = self.guard(request_key(request_id))?;
        let session = self.require_session().await?;
        self.send(
            self.authed(Method::POST, "/complete-request", &session)
                .json(&CompleteRequest { request_id }),
        )
        .await
    }

    pub async fn transactions(&self) -> Result<Vec<TransactionView>, ApiError> {
        let session = self.require_session().await?;
        let path = format!("/transactions/{}", session.user_id);
        self.send(self.authed(Method::GET, &path, &session)).await
    }

    pub async fn submit_review(&self, review: &SubmitReview) -> Result<Ack, ApiError> {
        let _guard = self.guard(format!("transaction:{}", review.transaction_id))?;
        let session = self.require_session().await?;
        self.send(self.authed(Method::POST, "/submit-review", &session).json(review))
            .await
    }

    /// Loads the dashboard's four lists concurrently.
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        let (profile, skills, sent, received) = futures::try_join!(
            self.profile(),
            self.own_skills(),
            self.sent_requests(),
            self.received_requests(),
        )?;
        Ok(Dashboard {
            profile,
            skills,
            sent,
            received,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&session.access_token)
    }

    async fn require_session(&self) -> Result<Session, ApiError> {
        self.session
            .load()
            .await?
            .ok_or_else(|| ApiError::new("Please log in to continue"))
    }

    fn guard(&self, key: String) -> Result<InFlightGuard, ApiError> {
        self.in_flight
            .begin(key)
            .ok_or_else(|| ApiError::new("This action is already in progress"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|error| error.message)
                .ok()
                .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
            tracing::debug!("request failed with {status}: {message}");
            return Err(ApiError {
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

fn request_key(request_id: Uuid) -> String {
    format!("request:{request_id}")
}
