//! Session opening for authenticated users.
//!
//! Both login paths (password and passkey) end here: issue a fresh token and
//! bind it to the user, replacing any earlier session.

use crate::app_state::AppState;
use axum::http::StatusCode;
use uuid::Uuid;

// ---

/// Issues a token for `user_id` and stores it as the user's only session.
///
/// # Returns
/// The bearer token on success, or HTTP 500 on codec or storage failure
pub async fn open_session(state: &AppState, user_id: Uuid) -> Result<String, StatusCode> {
    //
    let token = state.codec().issue().map_err(|e| {
        //
        tracing::error!("Failed to issue token: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    state
        .sessions()
        .set_session(user_id, &token)
        .await
        .map_err(|e| {
            //
            tracing::error!("Failed to store session: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!(%user_id, codec = state.codec().name(), "Opened session");

    Ok(token)
}
