#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use skill_exchange::db::memory::MemoryRepository;
use skill_exchange::routes::{build_router, AppState};

pub const PASSWORD: &str = "Exch4nge!";

/// Serves a fresh in-memory instance on an ephemeral port and returns its base URL.
pub async fn spawn_app() -> String {
    let state = AppState::new(
        Arc::new(MemoryRepository::new()),
        "integration-secret".to_string(),
        Duration::minutes(30),
    );
    let router = build_router(state, "http://localhost:3000").expect("router builds");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server runs");
    });
    format!("http://{addr}")
}

pub struct Member {
    pub id: Uuid,
    pub token: String,
}

/// Registers and logs in a user over raw HTTP.
pub async fn sign_up(http: &reqwest::Client, base: &str, name: &str) -> Member {
    let email = format!("{}@example.com", name.to_lowercase());
    let response = http
        .post(format!("{base}/register"))
        .json(&json!({
            "name": name,
            "email": email,
            "phone": "555 0100",
            "location": "Nairobi",
            "bio": "Happy to swap skills",
            "password": PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = http
        .post(format!("{base}/login"))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    Member {
        id: body["userId"].as_str().unwrap().parse().unwrap(),
        token: body["accessToken"].as_str().unwrap().to_string(),
    }
}
