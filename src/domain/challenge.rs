//! Ephemeral key-value storage for WebAuthn ceremonies.
//!
//! Holds two kinds of opaque blobs per user: the in-flight ceremony state and
//! the finalized passkey credential. The store never looks inside them.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Which ceremony a stored challenge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CeremonyKind {
    // ---
    Registration,
    Login,
}

impl CeremonyKind {
    // ---
    /// Key prefix segment used by key-value backends.
    pub fn key_segment(&self) -> &'static str {
        // ---
        match self {
            CeremonyKind::Registration => "reg",
            CeremonyKind::Login => "auth",
        }
    }
}

impl fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CeremonyKind::Registration => f.write_str("registration"),
            CeremonyKind::Login => f.write_str("login"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    // ---
    #[error("challenge or credential not found")]
    NotFound,

    #[error("challenge storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<redis::RedisError> for ChallengeError {
    fn from(err: redis::RedisError) -> Self {
        ChallengeError::Storage(err.into())
    }
}

#[async_trait::async_trait]
pub trait ChallengeStore: Send + Sync {
    // ---
    /// Connectivity check used by the full health check.
    async fn ping(&self) -> Result<(), ChallengeError>;

    /// Stores (or overwrites) the user's in-flight challenge for `kind`.
    async fn put_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
        challenge: &[u8],
    ) -> Result<(), ChallengeError>;

    /// Reads the challenge without consuming it.
    async fn get_challenge(&self, kind: CeremonyKind, user_id: Uuid)
        -> Result<Vec<u8>, ChallengeError>;

    /// Reads and deletes the challenge in one atomic step.
    async fn take_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
    ) -> Result<Vec<u8>, ChallengeError>;

    /// Stores (or overwrites) the user's credential. Credentials never expire.
    async fn put_credential(&self, user_id: Uuid, credential: &[u8]) -> Result<(), ChallengeError>;

    async fn get_credential(&self, user_id: Uuid) -> Result<Vec<u8>, ChallengeError>;

    /// Removes the user's credential. Deleting a missing credential is not an error.
    async fn delete_credential(&self, user_id: Uuid) -> Result<(), ChallengeError>;
}

/// Type alias for any backend that implements ChallengeStore.
pub type ChallengeStorePtr = Arc<dyn ChallengeStore>;
