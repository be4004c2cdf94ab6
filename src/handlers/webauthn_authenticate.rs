//! WebAuthn authentication handlers.
//!
//! 1. `passkey_login_begin` - Generate a challenge for the user's passkey
//! 2. `passkey_login_finish` - Verify the assertion and open a session

use super::shared_types::{api_error, internal_error, ApiError, ApiResponse};
use super::users::TokenResponse;
use crate::app_state::AppState;
use crate::domain::{CeremonyError, User};
use crate::session::open_session;
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct LoginBeginRequest {
    // ---
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginFinishRequest {
    // ---
    pub email: String,
    pub credential: Value,
}

fn auth_failed() -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "Authentication failed")
}

async fn find_user(state: &AppState, email: &str) -> Result<User, ApiError> {
    // ---
    state
        .repository()
        .get_user_by_email(&email.trim().to_lowercase())
        .await
        .map_err(|e| {
            tracing::error!("Failed to query user: {}", e);
            internal_error()
        })?
        .ok_or_else(auth_failed)
}

fn ceremony_error(err: CeremonyError) -> ApiError {
    // ---
    match err {
        CeremonyError::CeremonyFailed => auth_failed(),
        CeremonyError::Storage(e) => {
            tracing::error!("Authentication storage failure: {:?}", e);
            internal_error()
        }
    }
}

/// POST /api/v1/users/webauthn/login/begin
///
/// Returns credential request options for `navigator.credentials.get()`.
pub async fn passkey_login_begin(
    State(state): State<AppState>,
    Json(req): Json<LoginBeginRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    // ---
    let user = find_user(&state, &req.email).await?;
    let options = state
        .ceremony()
        .begin_login(&user)
        .await
        .map_err(ceremony_error)?;

    Ok(ApiResponse { data: options })
}

/// POST /api/v1/users/webauthn/login/finish
///
/// Verifies the assertion against the stored passkey and returns a bearer
/// token exactly like password login.
pub async fn passkey_login_finish(
    State(state): State<AppState>,
    Json(req): Json<LoginFinishRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    // ---
    let user = find_user(&state, &req.email).await?;
    state
        .ceremony()
        .finish_login(&user, &req.credential)
        .await
        .map_err(ceremony_error)?;

    let token = open_session(&state, user.id)
        .await
        .map_err(|status| api_error(status, "Failed to open session"))?;

    state.metrics().record_login("passkey");
    Ok(ApiResponse {
        data: TokenResponse { token },
    })
}
