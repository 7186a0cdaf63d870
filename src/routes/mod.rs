use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use chrono::Duration;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::db::ExchangeRepository;
use crate::exchange::ExchangeService;

pub mod auth;
pub mod requests;
pub mod skills;
pub mod tx;
pub mod user;
pub mod utils;

use auth::AuthService;

const BODY_LIMIT_BYTES: usize = 10 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub exchange: Arc<ExchangeService>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ExchangeRepository>, jwt_secret: String, token_ttl: Duration) -> Self {
        Self {
            auth: Arc::new(AuthService::new(repo.clone(), jwt_secret, token_ttl)),
            exchange: Arc::new(ExchangeService::new(repo)),
        }
    }
}

pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router, String> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .map_err(|err| format!("Invalid CORS origin {cors_origin:?}: {err}"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let router = Router::new()
        .route("/", get(index))
        .merge(auth::auth_routes())
        .merge(user::user_routes())
        .merge(skills::skill_routes())
        .merge(requests::request_routes())
        .merge(tx::tx_routes())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

async fn index() -> &'static str {
    "Skill exchange API is up."
}
