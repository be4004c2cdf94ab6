//! Passkey registration and login ceremonies.
//!
//! Each ceremony is two requests. The first stores the verifier's state in
//! the challenge store keyed by ceremony kind and user id; the second consumes
//! it atomically, so a finish step can succeed at most once per begin.

use crate::domain::{
    CeremonyError, CeremonyKind, ChallengeStorePtr, PasskeyVerifierPtr, User,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// Pending registration: the account does not exist yet, so the email
/// travels with the verifier state.
#[derive(Serialize, Deserialize)]
struct PendingRegistration {
    user_id: Uuid,
    email: String,
    state: Vec<u8>,
}

pub struct CeremonyOrchestrator {
    verifier: PasskeyVerifierPtr,
    challenges: ChallengeStorePtr,
}

impl CeremonyOrchestrator {
    // ---
    pub fn new(verifier: PasskeyVerifierPtr, challenges: ChallengeStorePtr) -> Self {
        // ---
        Self {
            verifier,
            challenges,
        }
    }

    /// Starts registration for a not-yet-persisted user.
    ///
    /// Calling this again for the same user id replaces the pending challenge.
    pub async fn begin_registration(&self, user: &User) -> Result<Value, CeremonyError> {
        // ---
        let start = self.verifier.start_registration(user)?;
        let pending = PendingRegistration {
            user_id: user.id,
            email: user.email.clone(),
            state: start.state,
        };
        let blob = serde_json::to_vec(&pending).map_err(|e| CeremonyError::Storage(e.into()))?;

        self.challenges
            .put_challenge(CeremonyKind::Registration, user.id, &blob)
            .await?;

        info!(user_id = %user.id, "Passkey registration started");
        Ok(start.options)
    }

    /// Completes registration and returns the user the credential belongs to.
    ///
    /// The challenge is consumed before verification: a failed attempt must
    /// begin again.
    pub async fn finish_registration(
        &self,
        user_id: Uuid,
        response: &Value,
    ) -> Result<User, CeremonyError> {
        // ---
        let blob = self
            .challenges
            .take_challenge(CeremonyKind::Registration, user_id)
            .await?;
        let pending: PendingRegistration = serde_json::from_slice(&blob).map_err(|e| {
            warn!(%user_id, error = %e, "Stored registration state is unreadable");
            CeremonyError::CeremonyFailed
        })?;

        let credential = self.verifier.finish_registration(response, &pending.state)?;
        self.challenges.put_credential(user_id, &credential).await?;

        let mut user = User::new(pending.email, None);
        user.id = pending.user_id;

        info!(%user_id, "Passkey registration completed");
        Ok(user)
    }

    /// Undoes a finished registration whose user record could not be created.
    ///
    /// Leaves no credential behind for the never-persisted user id.
    pub async fn abandon_registration(&self, user_id: Uuid) -> Result<(), CeremonyError> {
        // ---
        self.challenges.delete_credential(user_id).await?;
        warn!(%user_id, "Passkey registration rolled back");
        Ok(())
    }

    /// Starts login for a user with a registered passkey.
    pub async fn begin_login(&self, user: &User) -> Result<Value, CeremonyError> {
        // ---
        let credential = self.challenges.get_credential(user.id).await?;
        let start = self.verifier.start_login(&credential)?;

        self.challenges
            .put_challenge(CeremonyKind::Login, user.id, &start.state)
            .await?;

        info!(user_id = %user.id, "Passkey login started");
        Ok(start.options)
    }

    /// Verifies the assertion and persists the credential's advanced counter.
    pub async fn finish_login(&self, user: &User, response: &Value) -> Result<(), CeremonyError> {
        // ---
        let state = self
            .challenges
            .take_challenge(CeremonyKind::Login, user.id)
            .await?;
        let credential = self.challenges.get_credential(user.id).await?;

        let updated = self.verifier.finish_login(response, &state, &credential)?;
        self.challenges.put_credential(user.id, &updated).await?;

        info!(user_id = %user.id, "Passkey login verified");
        Ok(())
    }
}
