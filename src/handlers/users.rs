//! Password account handlers: signup, login, logout.

use super::shared_types::{api_error, internal_error, is_valid_email, ApiError, ApiResponse};
use crate::app_state::AppState;
use crate::auth::{hash_password, verify_login, AuthUser};
use crate::domain::User;
use crate::session::open_session;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    // ---
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    // ---
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    // ---
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/users/signup
///
/// Creates a password account. An already-registered email gets the same
/// generic failure as any other rejected signup.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, ApiResponse<UserResponse>), ApiError> {
    // ---
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Password must be at least 8 characters",
        ));
    }

    let existing = state.repository().get_user_by_email(&email).await.map_err(|e| {
        tracing::error!("Failed to query user: {}", e);
        internal_error()
    })?;
    if existing.is_some() {
        tracing::info!("Signup rejected for already registered email");
        return Err(api_error(StatusCode::BAD_REQUEST, "Signup failed"));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("{}", e);
        internal_error()
    })?;
    let user = User::new(email, Some(password_hash));

    state.repository().create_user(&user).await.map_err(|e| {
        tracing::warn!("Failed to create user: {}", e);
        api_error(StatusCode::BAD_REQUEST, "Signup failed")
    })?;

    tracing::info!(user_id = %user.id, "User signed up");
    Ok((
        StatusCode::CREATED,
        ApiResponse {
            data: UserResponse::from(&user),
        },
    ))
}

/// POST /api/v1/users/login
///
/// Verifies the password and opens a session. Unknown email, passkey-only
/// account and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    // ---
    let email = req.email.trim().to_lowercase();
    let user = state.repository().get_user_by_email(&email).await.map_err(|e| {
        tracing::error!("Failed to query user: {}", e);
        internal_error()
    })?;

    let stored_hash = user.as_ref().and_then(|u| u.password_hash.as_deref());
    let verified = verify_login(&req.password, stored_hash);
    let Some(user) = user.filter(|_| verified) else {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Invalid email or password"));
    };

    let token = open_session(&state, user.id)
        .await
        .map_err(|status| api_error(status, "Failed to open session"))?;

    state.metrics().record_login("password");
    Ok(ApiResponse {
        data: TokenResponse { token },
    })
}

/// POST /api/v1/users/logout
///
/// Ends the caller's session. The token stops working immediately.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, ApiError> {
    // ---
    state.sessions().delete_session(user_id).await.map_err(|e| {
        tracing::error!("Failed to delete session: {}", e);
        internal_error()
    })?;

    tracing::info!(%user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}
