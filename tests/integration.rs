use axum::http::StatusCode;
use exptr_api::domain::SessionStore;
use serde_json::json;

mod common;

use common::{TestApp, TEST_PASSWORD};

#[tokio::test]
async fn root_endpoint_lists_api() {
    // ---
    let app = TestApp::new();
    let (status, body) = app.get("/", None).await;

    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
    assert!(text.contains("/api/v1/users/login"));
}

#[tokio::test]
async fn health_endpoint_light_and_full() {
    // ---
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = app.get("/health?mode=full", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_route_is_404() {
    // ---
    let app = TestApp::new();
    let (status, _) = app.get("/api/v1/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_login_logout_flow() {
    // ---
    let app = TestApp::new();
    let (user_id, token) = app.register("bilbo@shire.test").await;

    assert_eq!(app.sessions.get_user_id_by_token(&token).await.unwrap(), user_id);

    let (status, _) = app.get("/api/v1/categories", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send("POST", "/api/v1/users/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get("/api/v1/categories", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn signup_response_hides_password_hash() {
    // ---
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/v1/users/signup",
            None,
            json!({ "email": "Frodo@Shire.test", "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "frodo@shire.test");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn signup_rejects_bad_input() {
    // ---
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/users/signup",
            None,
            json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email");

    let (status, _) = app
        .post(
            "/api/v1/users/signup",
            None,
            json!({ "email": "sam@shire.test", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_signup_gets_generic_error() {
    // ---
    let app = TestApp::new();
    app.register("merry@shire.test").await;

    let (status, body) = app
        .post(
            "/api/v1/users/signup",
            None,
            json!({ "email": "merry@shire.test", "password": "another-password" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Signup failed" }));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    // ---
    let app = TestApp::new();
    app.register("pippin@shire.test").await;

    let (wrong_status, wrong_body) = app
        .post(
            "/api/v1/users/login",
            None,
            json!({ "email": "pippin@shire.test", "password": "wrong-password" }),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .post(
            "/api/v1/users/login",
            None,
            json!({ "email": "nobody@shire.test", "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn second_login_replaces_first_session() {
    // ---
    let app = TestApp::new();
    let (_, first) = app.register("gandalf@valinor.test").await;
    let second = app.login("gandalf@valinor.test").await;

    assert_ne!(first, second);
    assert_eq!(app.sessions.len(), 1);

    let (status, _) = app.get("/api/v1/categories", Some(&first)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/api/v1/categories", Some(&second)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn passkey_only_and_unknown_accounts_fail_alike() {
    // ---
    let app = TestApp::new();
    let (_, begin) = app
        .post(
            "/api/v1/users/webauthn/signup/begin",
            None,
            json!({ "email": "beorn@carrock.test" }),
        )
        .await;
    let options = begin["data"]["options"].clone();
    let (status, _) = app
        .post(
            "/api/v1/users/webauthn/signup/finish",
            None,
            json!({
                "user_id": begin["data"]["user_id"],
                "credential": common::attestation_for(&options),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut responses = Vec::new();
    for email in ["beorn@carrock.test", "nobody@carrock.test"] {
        responses.push(
            app.post(
                "/api/v1/users/login",
                None,
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await,
        );
    }

    assert_eq!(responses[0].0, StatusCode::UNAUTHORIZED);
    assert_eq!(responses[0], responses[1]);
}
