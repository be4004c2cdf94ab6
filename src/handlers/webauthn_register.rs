//! WebAuthn registration handlers.
//!
//! Implements the two-phase passkey signup flow:
//! 1. `passkey_signup_begin` - Generate a challenge for a pending account
//! 2. `passkey_signup_finish` - Verify the attestation, then persist the account

use super::shared_types::{api_error, internal_error, is_valid_email, ApiError, ApiResponse};
use super::users::UserResponse;
use crate::app_state::AppState;
use crate::domain::{CeremonyError, User};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupBeginRequest {
    // ---
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignupBeginResponse {
    // ---
    /// Must be echoed back in the finish request.
    pub user_id: Uuid,
    /// Credential creation options for `navigator.credentials.create()`.
    pub options: Value,
}

#[derive(Debug, Deserialize)]
pub struct SignupFinishRequest {
    // ---
    pub user_id: Uuid,
    pub credential: Value,
}

// ============================================================================
// Registration Begin Handler
// ============================================================================

/// POST /api/v1/users/webauthn/signup/begin
///
/// # Request Body
/// ```json
/// { "email": "user@example.com" }
/// ```
///
/// The account is not created until the finish step succeeds.
pub async fn passkey_signup_begin(
    State(state): State<AppState>,
    Json(req): Json<SignupBeginRequest>,
) -> Result<ApiResponse<SignupBeginResponse>, ApiError> {
    // ---
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid email"));
    }

    let existing = state.repository().get_user_by_email(&email).await.map_err(|e| {
        tracing::error!("Failed to query user: {}", e);
        internal_error()
    })?;
    if existing.is_some() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Signup failed"));
    }

    let pending = User::new(email, None);
    let options = state
        .ceremony()
        .begin_registration(&pending)
        .await
        .map_err(ceremony_error)?;

    Ok(ApiResponse {
        data: SignupBeginResponse {
            user_id: pending.id,
            options,
        },
    })
}

// ============================================================================
// Registration Finish Handler
// ============================================================================

/// POST /api/v1/users/webauthn/signup/finish
///
/// Consumes the pending challenge, verifies the authenticator's attestation
/// and creates the account.
pub async fn passkey_signup_finish(
    State(state): State<AppState>,
    Json(req): Json<SignupFinishRequest>,
) -> Result<(StatusCode, ApiResponse<UserResponse>), ApiError> {
    // ---
    let user = state
        .ceremony()
        .finish_registration(req.user_id, &req.credential)
        .await
        .map_err(ceremony_error)?;

    if let Err(e) = state.repository().create_user(&user).await {
        tracing::warn!("Failed to persist passkey user: {}", e);
        state
            .ceremony()
            .abandon_registration(user.id)
            .await
            .map_err(ceremony_error)?;
        return Err(api_error(StatusCode::BAD_REQUEST, "Signup failed"));
    }

    tracing::info!(user_id = %user.id, "Passkey user signed up");
    Ok((
        StatusCode::CREATED,
        ApiResponse {
            data: UserResponse::from(&user),
        },
    ))
}

fn ceremony_error(err: CeremonyError) -> ApiError {
    // ---
    match err {
        CeremonyError::CeremonyFailed => api_error(StatusCode::BAD_REQUEST, "Registration failed"),
        CeremonyError::Storage(e) => {
            tracing::error!("Registration storage failure: {:?}", e);
            internal_error()
        }
    }
}
