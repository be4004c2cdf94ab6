// Test helpers are intentionally partially used
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use exptr_api::domain::{
    CeremonyError, CeremonyStart, MetricsPtr, PasskeyVerifier, TokenCodec, User,
};
use exptr_api::{
    cors_layer, create_noop_metrics, create_router, AppState, HmacTokenCodec, MemoryChallengeStore,
    MemoryRepository, MemorySessionStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const TEST_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Fake passkey verifier
// ============================================================================

/// Credential blob produced by [`FakeVerifier`].
#[derive(Debug, Serialize, Deserialize)]
pub struct FakeCredential {
    pub credential_id: String,
    pub counter: u32,
}

/// Deterministic stand-in for a WebAuthn authenticator + verifier.
///
/// A response is valid when it echoes the challenge from the options (and,
/// for login, names the registered credential id).
pub struct FakeVerifier;

fn fresh_challenge() -> String {
    Uuid::new_v4().simple().to_string()
}

fn expected_challenge(state: &[u8]) -> Result<&str, CeremonyError> {
    std::str::from_utf8(state).map_err(|_| CeremonyError::CeremonyFailed)
}

impl PasskeyVerifier for FakeVerifier {
    // ---
    fn start_registration(&self, user: &User) -> Result<CeremonyStart, CeremonyError> {
        // ---
        let challenge = fresh_challenge();
        Ok(CeremonyStart {
            options: json!({
                "publicKey": {
                    "challenge": challenge,
                    "user": { "id": user.id, "name": user.email },
                }
            }),
            state: challenge.into_bytes(),
        })
    }

    fn finish_registration(
        &self,
        response: &Value,
        state: &[u8],
    ) -> Result<Vec<u8>, CeremonyError> {
        // ---
        if response["challenge"] != expected_challenge(state)? {
            return Err(CeremonyError::CeremonyFailed);
        }
        let credential = FakeCredential {
            credential_id: Uuid::new_v4().to_string(),
            counter: 0,
        };
        serde_json::to_vec(&credential).map_err(|e| CeremonyError::Storage(e.into()))
    }

    fn start_login(&self, credential: &[u8]) -> Result<CeremonyStart, CeremonyError> {
        // ---
        let credential: FakeCredential =
            serde_json::from_slice(credential).map_err(|_| CeremonyError::CeremonyFailed)?;
        let challenge = fresh_challenge();
        Ok(CeremonyStart {
            options: json!({
                "publicKey": {
                    "challenge": challenge,
                    "allowCredentials": [credential.credential_id],
                }
            }),
            state: challenge.into_bytes(),
        })
    }

    fn finish_login(
        &self,
        response: &Value,
        state: &[u8],
        credential: &[u8],
    ) -> Result<Vec<u8>, CeremonyError> {
        // ---
        let mut credential: FakeCredential =
            serde_json::from_slice(credential).map_err(|_| CeremonyError::CeremonyFailed)?;
        if response["challenge"] != expected_challenge(state)?
            || response["credential_id"] != credential.credential_id.as_str()
        {
            return Err(CeremonyError::CeremonyFailed);
        }
        credential.counter += 1;
        serde_json::to_vec(&credential).map_err(|e| CeremonyError::Storage(e.into()))
    }
}

/// What a browser would send back after `navigator.credentials.create()`.
pub fn attestation_for(options: &Value) -> Value {
    json!({ "challenge": options["publicKey"]["challenge"] })
}

/// What a browser would send back after `navigator.credentials.get()`.
pub fn assertion_for(options: &Value) -> Value {
    json!({
        "challenge": options["publicKey"]["challenge"],
        "credential_id": options["publicKey"]["allowCredentials"][0],
    })
}

// ============================================================================
// Test application
// ============================================================================

/// Router over in-memory backends, with handles to each backend for assertions.
pub struct TestApp {
    pub router: Router,
    pub repository: Arc<MemoryRepository>,
    pub sessions: Arc<MemorySessionStore>,
    pub challenges: Arc<MemoryChallengeStore>,
    pub codec: Arc<HmacTokenCodec>,
}

impl TestApp {
    // ---
    pub fn new() -> Self {
        Self::with_metrics(create_noop_metrics().expect("noop metrics"))
    }

    pub fn with_metrics(metrics: MetricsPtr) -> Self {
        // ---
        let repository = Arc::new(MemoryRepository::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let challenges = Arc::new(MemoryChallengeStore::new(Duration::from_secs(300)));
        let codec = Arc::new(HmacTokenCodec::new(
            TEST_SECRET,
            "backend.exptr",
            "frontend.exptr",
            Duration::from_secs(3600),
        ));

        let state = AppState::new(
            repository.clone(),
            sessions.clone(),
            challenges.clone(),
            codec.clone(),
            Arc::new(FakeVerifier),
            metrics,
        );

        Self {
            router: create_router(state, cors_layer(&[TEST_ORIGIN.to_string()]).unwrap()),
            repository,
            sessions,
            challenges,
            codec,
        }
    }

    /// Sends a request and returns the status and body (JSON, text, or null).
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        // ---
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        // ---
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", path, token, Some(body)).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", path, token, None).await
    }

    /// Password signup + login. Returns `(user_id, token)`.
    pub async fn register(&self, email: &str) -> (Uuid, String) {
        // ---
        let (status, body) = self
            .post(
                "/api/v1/users/signup",
                None,
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        let user_id: Uuid = serde_json::from_value(body["data"]["id"].clone()).unwrap();

        let token = self.login(email).await;
        (user_id, token)
    }

    pub async fn login(&self, email: &str) -> String {
        // ---
        let (status, body) = self
            .post(
                "/api/v1/users/login",
                None,
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// A token that verifies under the test codec but has no session.
    pub fn orphan_token(&self) -> String {
        self.codec.issue().unwrap()
    }
}
