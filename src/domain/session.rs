//! Session store contract.
//!
//! A session binds one live token to one user. The store keeps at most one
//! session per user: logging in again replaces the previous token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One live authentication token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    // ---
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    // ---
    pub fn new(user_id: Uuid, token: String) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    // ---
    #[error("session not found")]
    NotFound,

    #[error("session storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        SessionError::Storage(err.into())
    }
}

/// Persistence of token → user bindings.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    // ---
    /// Upsert: creates the user's session, or replaces its token and
    /// creation time if one already exists.
    async fn set_session(&self, user_id: Uuid, token: &str) -> Result<(), SessionError>;

    /// Rewrites the token of an existing session.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the user has no session.
    async fn update_session(&self, user_id: Uuid, token: &str) -> Result<(), SessionError>;

    /// Resolves the user owning `token`. Called on every authenticated request.
    async fn get_user_id_by_token(&self, token: &str) -> Result<Uuid, SessionError>;

    /// Returns the id of the user's session, if any.
    async fn get_session_id(&self, user_id: Uuid) -> Result<Uuid, SessionError>;

    /// Logout. Deleting a session that does not exist is not an error.
    async fn delete_session(&self, user_id: Uuid) -> Result<(), SessionError>;

    /// Removes every session created strictly before `cutoff`.
    /// Returns the number of sessions removed.
    async fn delete_sessions_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError>;

    /// Removes every session older than `max_age`.
    async fn delete_expired_sessions(&self, max_age: Duration) -> Result<u64, SessionError> {
        // ---
        self.delete_sessions_created_before(Utc::now() - max_age)
            .await
    }
}

/// Type alias for any backend that implements SessionStore.
pub type SessionStorePtr = Arc<dyn SessionStore>;
