use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_email::Email;
use std::sync::Arc;
use uuid::Uuid;

use super::{utils::AppJson, AppState};
use crate::db::user::NewUser;
use crate::db::ExchangeRepository;
use crate::error::{ExchangeError, ExchangeResult};
use crate::types::{AuthResponse, RegisterResponse};
use crate::validation;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    sub: Uuid, // user_id
    exp: i64,  // expiration timestamp
    iat: i64,  // issued at timestamp
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub bio: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// Authentication service
pub struct AuthService {
    repo: Arc<dyn ExchangeRepository>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(repo: Arc<dyn ExchangeRepository>, jwt_secret: String, token_ttl: Duration) -> Self {
        Self {
            repo,
            jwt_secret,
            token_ttl,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> ExchangeResult<RegisterResponse> {
        let email = req.email.as_str().to_lowercase();
        let name = validation::required_text("Name", &req.name, 2)?;
        let phone = validation::check_phone(req.phone.as_deref())?;

        //check for password validity
        validation::check_password(&req.password)?;

        // Check if user already exists
        if self.repo.find_credentials(&email).await?.is_some() {
            return Err(ExchangeError::conflict("Email is already registered"));
        }

        // Hash password
        let salt = SaltString::generate(&mut rand::thread_rng());
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|err| {
                tracing::error!("unable to hash password: {err}");
                ExchangeError::Storage("Unable to register user".to_string())
            })?
            .to_string();

        let user = self
            .repo
            .create_user(NewUser {
                name,
                email,
                phone,
                location: validation::optional_text(req.location.as_deref()),
                bio: req.bio.trim().to_string(),
                password_hash,
            })
            .await?;
        tracing::info!("user created with email: {}", user.email);

        Ok(RegisterResponse {
            success: true,
            message: "User registered successfully.".to_string(),
            user_id: user.id,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> ExchangeResult<AuthResponse> {
        let email = req.email.as_str().to_lowercase();
        tracing::info!("Attempting to log in user with email: {}", email);

        let credentials = self
            .repo
            .find_credentials(&email)
            .await?
            .ok_or_else(|| ExchangeError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;

        // Verify password
        let parsed_hash = PasswordHash::new(&credentials.password_hash).map_err(|err| {
            tracing::error!("stored password hash for {email} is unreadable: {err}");
            ExchangeError::Storage("Unable to verify credentials".to_string())
        })?;
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid credentials for user: {}", email);
            return Err(ExchangeError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        let access_token = self.generate_token(credentials.user_id)?;
        tracing::info!("Generated token for user: {}", email);

        Ok(AuthResponse {
            success: true,
            user_id: credentials.user_id,
            access_token,
        })
    }

    pub fn verify_token(&self, token: &str) -> ExchangeResult<Uuid> {
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.leeway = 10;
        validation.validate_exp = true;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &jsonwebtoken::DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|err| {
            tracing::error!("Error decoding token: {:?}", err);
            ExchangeError::Unauthenticated("Invalid token".to_string())
        })?;

        Ok(token_data.claims.sub)
    }

    fn generate_token(&self, user_id: Uuid) -> ExchangeResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };

        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|err| {
            tracing::error!("unable to sign token: {err}");
            ExchangeError::Storage("Unable to issue token".to_string())
        })
    }
}

// Route for handling new user registration
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ExchangeError> {
    let response = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// Route for handling user login
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<AppJson<LoginRequest>, ExchangeError>,
) -> Result<impl IntoResponse, ExchangeError> {
    // a malformed email fails the same way as a wrong one
    let AppJson(req) = payload.map_err(|err| {
        tracing::warn!("Unreadable login body: {}", err);
        ExchangeError::Unauthenticated(INVALID_CREDENTIALS.to_string())
    })?;
    let response = state.auth.login(req).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
}
