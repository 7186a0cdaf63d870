use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use super::{auth::AuthService, AppState};
use crate::error::{ExchangeError, ExchangeResult};

#[inline]
pub fn validate_auth_token(headers: &HeaderMap, service: &AuthService) -> ExchangeResult<Uuid> {
    let jwt_header_token = match headers.get(AUTHORIZATION).map(|token| token.to_str()) {
        Some(Ok(token)) => token.trim(),
        _ => {
            return Err(ExchangeError::Unauthenticated(
                "Please log in to continue".to_string(),
            ));
        }
    };
    // both "Bearer <jwt>" and a bare token are accepted
    let token = jwt_header_token
        .strip_prefix("Bearer ")
        .unwrap_or(jwt_header_token)
        .trim();
    service.verify_token(token)
}

/// Id of the caller, taken from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ExchangeError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match validate_auth_token(&parts.headers, &state.auth) {
            Ok(user) => Ok(AuthUser(user)),
            Err(err) => {
                tracing::warn!("Token validation failed on {}: {}", parts.uri.path(), err);
                Err(err)
            }
        }
    }
}

/// `axum::Json` that rejects bad bodies with an [`ExchangeError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ExchangeError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ExchangeError))]
pub struct AppPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ExchangeError))]
pub struct AppQuery<T>(pub T);
