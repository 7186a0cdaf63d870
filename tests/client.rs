mod common;

use skill_exchange::client::{ExchangeClient, RegisterForm, SessionStore};
use skill_exchange::types::{CreateSkill, SubmitReview, UpdateProfile};
use skill_exchange::RequestStatus;

use common::{spawn_app, PASSWORD};

fn client(base: &str, dir: &tempfile::TempDir, name: &str) -> ExchangeClient {
    ExchangeClient::new(base, SessionStore::new(dir.path().join(format!("{name}.json"))))
}

async fn join(client: &ExchangeClient, name: &str) -> uuid::Uuid {
    let email = format!("{}@example.com", name.to_lowercase());
    client
        .register(&RegisterForm {
            name,
            email: &email,
            phone: None,
            location: Some("Lisbon"),
            bio: "Always learning something",
            password: PASSWORD,
        })
        .await
        .unwrap();
    client.login(&email, PASSWORD).await.unwrap()
}

#[tokio::test]
async fn signed_out_client_is_told_to_log_in() {
    let base = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client(&base, &dir, "anon");

    assert_eq!(client.current_user().await.unwrap(), None);
    let err = client.sent_requests().await.unwrap_err();
    assert_eq!(err.message, "Please log in to continue");
    assert_eq!(err.status, None);

    // browsing works without a session
    assert!(client.browse_skills().await.unwrap().is_empty());
}

#[tokio::test]
async fn wrong_password_surfaces_the_server_message() {
    let base = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client(&base, &dir, "ada");
    join(&client, "Ada").await;
    client.logout().await.unwrap();

    let err = client.login("ada@example.com", "Wrong-pass1!").await.unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "Invalid email or password");
    assert_eq!(client.current_user().await.unwrap(), None);
}

#[tokio::test]
async fn full_exchange_through_the_client() {
    let base = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let owner = client(&base, &dir, "owner");
    let learner = client(&base, &dir, "learner");
    let owner_id = join(&owner, "Owner").await;
    let learner_id = join(&learner, "Learner").await;
    assert_eq!(owner.current_user().await.unwrap(), Some(owner_id));

    let skill_id = owner
        .create_skill(&CreateSkill {
            skill_name: "Pottery".to_string(),
            description: "Wheel throwing for beginners".to_string(),
            category: "Crafts".to_string(),
        })
        .await
        .unwrap();

    let browse = learner.browse_skills().await.unwrap();
    assert_eq!(browse.len(), 1);
    assert_eq!(browse[0].skill_id, skill_id);
    assert!(owner.browse_skills().await.unwrap().is_empty());

    let request_id = learner.create_request(skill_id).await.unwrap();
    owner.accept(request_id).await.unwrap();

    let dashboard = owner.dashboard().await.unwrap();
    assert_eq!(dashboard.profile.id, owner_id);
    assert_eq!(dashboard.skills.len(), 1);
    assert!(dashboard.sent.is_empty());
    assert_eq!(dashboard.received.len(), 1);
    assert_eq!(dashboard.received[0].status, RequestStatus::Accepted);
    assert_eq!(dashboard.received[0].user_id, learner_id);

    let completed = learner.complete(request_id).await.unwrap();
    let again = owner.complete(request_id).await.unwrap();
    assert_eq!(completed.transaction_id, again.transaction_id);

    let history = learner.transactions().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].has_review);

    let review = SubmitReview {
        transaction_id: completed.transaction_id,
        rating: 5,
        comments: "Patient and clear instructor".to_string(),
    };
    learner.submit_review(&review).await.unwrap();
    let err = learner.submit_review(&review).await.unwrap_err();
    assert_eq!(err.status, Some(409));
    assert!(owner.transactions().await.unwrap()[0].has_review);

    let err = owner.delete_skill(skill_id).await.unwrap_err();
    assert_eq!(err.status, Some(409));
    assert_eq!(err.message, "Cannot delete skill with associated requests");
}

#[tokio::test]
async fn rejected_request_cannot_be_completed() {
    let base = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let owner = client(&base, &dir, "owner");
    let learner = client(&base, &dir, "learner");
    join(&owner, "Owner").await;
    join(&learner, "Learner").await;

    let skill_id = owner
        .create_skill(&CreateSkill {
            skill_name: "Knots".to_string(),
            description: "Sailing knots and when to use them".to_string(),
            category: "Outdoors".to_string(),
        })
        .await
        .unwrap();
    let request_id = learner.create_request(skill_id).await.unwrap();
    owner.reject(request_id).await.unwrap();

    let err = learner.complete(request_id).await.unwrap_err();
    assert_eq!(err.status, Some(403));
    let err = owner.accept(request_id).await.unwrap_err();
    assert_eq!(err.status, Some(403));

    let sent = learner.sent_requests().await.unwrap();
    assert_eq!(sent[0].status, RequestStatus::Rejected);
}

#[tokio::test]
async fn duplicate_click_is_refused_while_the_first_is_in_flight() {
    let base = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let owner = client(&base, &dir, "owner");
    let learner = client(&base, &dir, "learner");
    join(&owner, "Owner").await;
    join(&learner, "Learner").await;

    let skill_id = owner
        .create_skill(&CreateSkill {
            skill_name: "Baking".to_string(),
            description: "Laminated doughs and croissants".to_string(),
            category: "Cooking".to_string(),
        })
        .await
        .unwrap();
    let request_id = learner.create_request(skill_id).await.unwrap();
    owner.accept(request_id).await.unwrap();

    let (first, second) = tokio::join!(learner.complete(request_id), learner.complete(request_id));
    assert!(first.is_ok());
    let err = second.unwrap_err();
    assert_eq!(err.message, "This action is already in progress");
    assert!(!learner.in_flight().is_busy(&format!("request:{request_id}")));

    assert_eq!(learner.transactions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn profile_update_round_trips() {
    let base = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client(&base, &dir, "ada");
    join(&client, "Ada").await;

    client
        .update_profile(&UpdateProfile {
            name: "Ada Lovelace".to_string(),
            phone: Some("020-7946".to_string()),
            location: Some("London".to_string()),
            bio: "Analytical engines and poetry".to_string(),
        })
        .await
        .unwrap();

    let profile = client.profile().await.unwrap();
    assert_eq!(profile.name, "Ada Lovelace");
    assert_eq!(profile.location.as_deref(), Some("London"));

    client.logout().await.unwrap();
    assert!(client.profile().await.is_err());
}
