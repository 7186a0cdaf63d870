use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::compression::CompressionLayer;
use uuid::Uuid;

use super::{utils::{AppJson, AppPath, AuthUser}, AppState};
use crate::error::ExchangeError;
use crate::types::{Ack, SubmitReview};

// return all transactions in which the user took part, either side
async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ExchangeError> {
    let transactions = state.exchange.transactions(user_id, caller).await?;
    tracing::info!("returning {} transaction(s) for {user_id}", transactions.len());
    Ok(Json(transactions))
}

async fn submit_review(
    State(state): State<AppState>,
    AuthUser(reviewer): AuthUser,
    AppJson(payload): AppJson<SubmitReview>,
) -> Result<impl IntoResponse, ExchangeError> {
    state
        .exchange
        .submit_review(
            payload.transaction_id,
            reviewer,
            payload.rating,
            &payload.comments,
        )
        .await?;
    Ok((StatusCode::OK, Json(Ack::ok("Review submitted successfully"))))
}

pub fn tx_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions/:id",
            get(list_transactions).route_layer(CompressionLayer::new().gzip(true)),
        )
        .route("/submit-review", post(submit_review))
}
