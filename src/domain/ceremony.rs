//! Passkey verification seam.
//!
//! The orchestrator only moves opaque state between the client, the
//! challenge store and a [`PasskeyVerifier`]. Client-facing options and client
//! responses travel as JSON so the verifier can be swapped in tests.

use super::challenge::ChallengeError;
use super::models::User;
use serde_json::Value;
use std::sync::Arc;

/// Output of a ceremony's first step.
#[derive(Debug, Clone)]
pub struct CeremonyStart {
    // ---
    /// Options the client hands to `navigator.credentials.*`.
    pub options: Value,

    /// Serialized server-side state; must come back unchanged on finish.
    pub state: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum CeremonyError {
    // ---
    /// Missing/consumed challenge, missing credential, or a response that
    /// failed verification.
    #[error("ceremony failed")]
    CeremonyFailed,

    #[error("ceremony storage failure: {0}")]
    Storage(anyhow::Error),
}

impl From<ChallengeError> for CeremonyError {
    fn from(err: ChallengeError) -> Self {
        // ---
        match err {
            ChallengeError::NotFound => CeremonyError::CeremonyFailed,
            ChallengeError::Storage(e) => CeremonyError::Storage(e),
        }
    }
}

/// Performs the WebAuthn cryptography for both ceremonies.
pub trait PasskeyVerifier: Send + Sync + 'static {
    // ---
    fn start_registration(&self, user: &User) -> Result<CeremonyStart, CeremonyError>;

    /// Verifies an attestation. Returns the serialized credential.
    fn finish_registration(&self, response: &Value, state: &[u8])
        -> Result<Vec<u8>, CeremonyError>;

    fn start_login(&self, credential: &[u8]) -> Result<CeremonyStart, CeremonyError>;

    /// Verifies an assertion against the stored credential. Returns the
    /// credential to persist (with an advanced signature counter).
    fn finish_login(
        &self,
        response: &Value,
        state: &[u8],
        credential: &[u8],
    ) -> Result<Vec<u8>, CeremonyError>;
}

/// Type alias for the deployment's passkey verifier.
pub type PasskeyVerifierPtr = Arc<dyn PasskeyVerifier>;
