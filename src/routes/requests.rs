use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::compression::CompressionLayer;

use super::{utils::{AppJson, AuthUser}, AppState};
use crate::error::ExchangeError;
use crate::exchange::StatusChange;
use crate::types::{Ack, CompleteRequest, CompletionResponse, CreateRequest, RequestCreated, UpdateRequest};

async fn create_request(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    AppJson(payload): AppJson<CreateRequest>,
) -> Result<impl IntoResponse, ExchangeError> {
    let request = state
        .exchange
        .create_request(requester, payload.skill_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RequestCreated {
            success: true,
            request_id: request.id,
        }),
    ))
}

// requests the caller sent
async fn sent_requests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ExchangeError> {
    Ok(Json(state.exchange.sent_requests(user).await?))
}

// requests for skills the caller owns
async fn received_requests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ExchangeError> {
    Ok(Json(state.exchange.received_requests(user).await?))
}

async fn update_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<UpdateRequest>,
) -> Result<impl IntoResponse, ExchangeError> {
    let message = match state
        .exchange
        .update_status(payload.request_id, user, payload.status.trim())
        .await?
    {
        StatusChange::Decided(status) => format!("Request updated to {status}"),
        StatusChange::Completed(_) => "Request completed and transaction created".to_string(),
    };
    Ok((StatusCode::OK, Json(Ack::ok(message))))
}

async fn complete_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CompleteRequest>,
) -> Result<impl IntoResponse, ExchangeError> {
    let completion = state.exchange.complete(payload.request_id, user).await?;
    let message = if completion.created {
        "Request completed and transaction created"
    } else {
        "Request was already completed"
    };
    Ok((
        StatusCode::OK,
        Json(CompletionResponse {
            success: true,
            message: message.to_string(),
            transaction_id: completion.transaction.id,
        }),
    ))
}

pub fn request_routes() -> Router<AppState> {
    let listings = Router::new()
        .route("/requests", get(sent_requests))
        .route("/received-requests", get(received_requests))
        .route_layer(CompressionLayer::new().gzip(true));

    Router::new()
        .route("/create-request", post(create_request))
        .route("/update-request", post(update_request))
        .route("/complete-request", post(complete_request))
        .merge(listings)
}
