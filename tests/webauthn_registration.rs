use axum::http::StatusCode;
use exptr_api::domain::{ChallengeStore, Repository};
use serde_json::json;
use uuid::Uuid;

mod common;

use common::{attestation_for, TestApp, TEST_PASSWORD};

const BEGIN: &str = "/api/v1/users/webauthn/signup/begin";
const FINISH: &str = "/api/v1/users/webauthn/signup/finish";

#[tokio::test]
async fn passkey_signup_creates_account() {
    // ---
    let app = TestApp::new();

    let (status, body) = app.post(BEGIN, None, json!({ "email": "Treebeard@Fangorn.test" })).await;
    assert_eq!(status, StatusCode::OK);
    let user_id: Uuid = serde_json::from_value(body["data"]["user_id"].clone()).unwrap();
    let options = body["data"]["options"].clone();

    // Nothing persisted until the ceremony completes.
    let stored = app.repository.get_user_by_email("treebeard@fangorn.test").await.unwrap();
    assert!(stored.is_none());

    let (status, body) = app
        .post(
            FINISH,
            None,
            json!({ "user_id": user_id, "credential": attestation_for(&options) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], "treebeard@fangorn.test");

    let user = app
        .repository
        .get_user_by_email("treebeard@fangorn.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, user_id);
    assert!(user.password_hash.is_none());
    assert!(app.challenges.get_credential(user_id).await.is_ok());
}

#[tokio::test]
async fn signup_begin_rejects_invalid_or_taken_email() {
    // ---
    let app = TestApp::new();
    app.register("quickbeam@fangorn.test").await;

    let (status, body) = app.post(BEGIN, None, json!({ "email": "nope" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email");

    let (status, body) = app.post(BEGIN, None, json!({ "email": "quickbeam@fangorn.test" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Signup failed");
}

#[tokio::test]
async fn signup_finish_with_bad_attestation_fails() {
    // ---
    let app = TestApp::new();

    let (_, body) = app.post(BEGIN, None, json!({ "email": "bregalad@fangorn.test" })).await;
    let user_id: Uuid = serde_json::from_value(body["data"]["user_id"].clone()).unwrap();

    let (status, body) = app
        .post(
            FINISH,
            None,
            json!({ "user_id": user_id, "credential": { "challenge": "wrong" } }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Registration failed" }));
    let stored = app.repository.get_user_by_email("bregalad@fangorn.test").await.unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn signup_finish_without_begin_fails() {
    // ---
    let app = TestApp::new();

    let (status, _) = app
        .post(
            FINISH,
            None,
            json!({ "user_id": Uuid::new_v4(), "credential": { "challenge": "x" } }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn passkey_only_user_cannot_password_login() {
    // ---
    let app = TestApp::new();

    let (_, body) = app.post(BEGIN, None, json!({ "email": "fimbrethil@fangorn.test" })).await;
    let user_id = body["data"]["user_id"].clone();
    let options = body["data"]["options"].clone();
    let (status, _) = app
        .post(
            FINISH,
            None,
            json!({ "user_id": user_id, "credential": attestation_for(&options) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/v1/users/login",
            None,
            json!({ "email": "fimbrethil@fangorn.test", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn losing_a_signup_race_leaves_no_credential() {
    // ---
    let app = TestApp::new();
    let email = json!({ "email": "shadowfax@rohan.test" });

    let (_, first) = app.post(BEGIN, None, email.clone()).await;
    let (_, second) = app.post(BEGIN, None, email).await;

    let mut outcomes = Vec::new();
    for begin in [&first, &second] {
        let user_id: Uuid = serde_json::from_value(begin["data"]["user_id"].clone()).unwrap();
        let options = begin["data"]["options"].clone();
        let (status, body) = app
            .post(
                FINISH,
                None,
                json!({ "user_id": user_id, "credential": attestation_for(&options) }),
            )
            .await;
        outcomes.push((user_id, status, body));
    }

    let (winner, status, _) = &outcomes[0];
    assert_eq!(*status, StatusCode::CREATED);
    assert!(app.challenges.get_credential(*winner).await.is_ok());

    let (loser, status, body) = &outcomes[1];
    assert_eq!(*status, StatusCode::BAD_REQUEST);
    assert_eq!(*body, json!({ "error": "Signup failed" }));
    let stored = app.repository.get_user_by_email("shadowfax@rohan.test").await.unwrap();
    assert_eq!(stored.map(|user| user.id), Some(*winner));
    assert!(app.challenges.get_credential(*loser).await.is_err());
}
