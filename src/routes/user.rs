use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{utils::{AppJson, AppPath, AuthUser}, AppState};
use crate::error::ExchangeError;
use crate::types::{Ack, UpdateProfile};

async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ExchangeError> {
    let user = state.exchange.profile(user_id, caller).await?;
    tracing::info!("User found: {}", user_id);
    Ok((StatusCode::OK, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateProfile>,
) -> Result<impl IntoResponse, ExchangeError> {
    state
        .exchange
        .update_profile(
            user_id,
            caller,
            &payload.name,
            payload.phone.as_deref(),
            payload.location.as_deref(),
            &payload.bio,
        )
        .await?;
    Ok((StatusCode::OK, Json(Ack::ok("Profile updated successfully"))))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/:id", get(get_user).put(update_user))
}
