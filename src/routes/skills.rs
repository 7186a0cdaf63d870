use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::compression::CompressionLayer;
use uuid::Uuid;

use super::{utils::{AppJson, AppPath, AppQuery, AuthUser}, AppState};
use crate::db::skill::SkillFilter;
use crate::error::ExchangeError;
use crate::types::{Ack, CreateSkill, SkillCreated, SkillsQuery};

// browsing is public; `userId` only decides whose skills are in or out
async fn list_skills(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SkillsQuery>,
) -> Result<impl IntoResponse, ExchangeError> {
    let filter = SkillFilter::from_query(query.user_id, query.own_skills);
    let skills = state.exchange.list_skills(filter).await?;
    tracing::debug!("listing {} skill(s) for {:?}", skills.len(), filter);
    Ok(Json(skills))
}

async fn create_skill(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    AppJson(payload): AppJson<CreateSkill>,
) -> Result<impl IntoResponse, ExchangeError> {
    let skill = state
        .exchange
        .create_skill(owner, &payload.skill_name, &payload.description, &payload.category)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SkillCreated {
            success: true,
            skill_id: skill.id,
        }),
    ))
}

async fn delete_skill(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(skill_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ExchangeError> {
    state.exchange.delete_skill(skill_id, caller).await?;
    Ok((StatusCode::OK, Json(Ack::ok("Skill deleted successfully"))))
}

pub fn skill_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/skills",
            get(list_skills).route_layer(CompressionLayer::new().gzip(true)),
        )
        .route("/create-skill", post(create_skill))
        .route("/skill/:id", delete(delete_skill))
}
