//! WebAuthn relying party and the passkey verifier built on it.
//!
//! Ceremony state (`PasskeyRegistration`, `PasskeyAuthentication`) and the
//! finalized `Passkey` are moved through the challenge store as JSON, which
//! requires the `danger-allow-state-serialisation` feature.

use std::str::FromStr;
use std::sync::Arc;

use crate::config::WebAuthnConfig;
use crate::domain::{CeremonyError, CeremonyStart, PasskeyVerifier, PasskeyVerifierPtr, User};
use anyhow::{anyhow, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use webauthn_rs::prelude::{
    Passkey, PasskeyAuthentication, PasskeyRegistration, PublicKeyCredential,
    RegisterPublicKeyCredential, Url,
};
use webauthn_rs::{Webauthn, WebauthnBuilder};

/// Creates a configured WebAuthn instance from application config.
///
/// The first configured origin is the primary one; the rest are appended as
/// additional allowed origins.
///
/// # Errors
/// Returns an error if an origin URL or the RP ID is malformed.
pub fn create_webauthn(config: &WebAuthnConfig) -> Result<Webauthn> {
    // ---
    tracing::debug!("Creating with config:{:?}", config);

    let (primary, extra) = config
        .origins
        .split_first()
        .ok_or_else(|| anyhow!("At least one WebAuthn origin is required"))?;

    let url = Url::from_str(primary)?;
    let mut builder = WebauthnBuilder::new(&config.rp_id, &url)?.rp_name(&config.rp_name);
    for origin in extra {
        builder = builder.append_allowed_origin(&Url::from_str(origin)?);
    }

    Ok(builder.build()?)
}

pub fn create_webauthn_verifier(config: &WebAuthnConfig) -> Result<PasskeyVerifierPtr> {
    // ---
    Ok(Arc::new(WebauthnVerifier::new(create_webauthn(config)?)))
}

/// [`PasskeyVerifier`] backed by `webauthn-rs` passkeys.
pub struct WebauthnVerifier {
    webauthn: Webauthn,
}

impl WebauthnVerifier {
    // ---
    pub fn new(webauthn: Webauthn) -> Self {
        Self { webauthn }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CeremonyError> {
    serde_json::to_vec(value).map_err(|e| CeremonyError::Storage(e.into()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T, CeremonyError> {
    // ---
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!(error = %e, "Stored {what} could not be decoded");
        CeremonyError::CeremonyFailed
    })
}

fn parse_response<T: DeserializeOwned>(response: &Value) -> Result<T, CeremonyError> {
    // ---
    T::deserialize(response).map_err(|e| {
        tracing::warn!(error = %e, "Client response is not a valid credential");
        CeremonyError::CeremonyFailed
    })
}

impl PasskeyVerifier for WebauthnVerifier {
    // ---
    fn start_registration(&self, user: &User) -> Result<CeremonyStart, CeremonyError> {
        // ---
        let (challenge, registration) = self
            .webauthn
            .start_passkey_registration(user.id, &user.email, &user.email, None)
            .map_err(|e| {
                tracing::error!("Failed to start passkey registration: {:?}", e);
                CeremonyError::CeremonyFailed
            })?;

        Ok(CeremonyStart {
            options: serde_json::to_value(&challenge)
                .map_err(|e| CeremonyError::Storage(e.into()))?,
            state: encode(&registration)?,
        })
    }

    fn finish_registration(
        &self,
        response: &Value,
        state: &[u8],
    ) -> Result<Vec<u8>, CeremonyError> {
        // ---
        let credential: RegisterPublicKeyCredential = parse_response(response)?;
        let registration: PasskeyRegistration = decode(state, "registration state")?;

        let passkey = self
            .webauthn
            .finish_passkey_registration(&credential, &registration)
            .map_err(|e| {
                tracing::warn!("Passkey attestation rejected: {:?}", e);
                CeremonyError::CeremonyFailed
            })?;

        encode(&passkey)
    }

    fn start_login(&self, credential: &[u8]) -> Result<CeremonyStart, CeremonyError> {
        // ---
        let passkey: Passkey = decode(credential, "passkey")?;
        let (challenge, authentication) = self
            .webauthn
            .start_passkey_authentication(&[passkey])
            .map_err(|e| {
                tracing::error!("Failed to start passkey authentication: {:?}", e);
                CeremonyError::CeremonyFailed
            })?;

        Ok(CeremonyStart {
            options: serde_json::to_value(&challenge)
                .map_err(|e| CeremonyError::Storage(e.into()))?,
            state: encode(&authentication)?,
        })
    }

    fn finish_login(
        &self,
        response: &Value,
        state: &[u8],
        credential: &[u8],
    ) -> Result<Vec<u8>, CeremonyError> {
        // ---
        let assertion: PublicKeyCredential = parse_response(response)?;
        let authentication: PasskeyAuthentication = decode(state, "authentication state")?;
        let mut passkey: Passkey = decode(credential, "passkey")?;

        let result = self
            .webauthn
            .finish_passkey_authentication(&assertion, &authentication)
            .map_err(|e| {
                tracing::warn!("Passkey assertion rejected: {:?}", e);
                CeremonyError::CeremonyFailed
            })?;

        if result.needs_update() {
            passkey.update_credential(&result);
        }
        encode(&passkey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn config(origins: &[&str]) -> WebAuthnConfig {
        WebAuthnConfig {
            rp_id: "localhost".to_string(),
            rp_name: "ExptrTracker".to_string(),
            origins: origins.iter().map(|o| o.to_string()).collect(),
            challenge_ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn create_webauthn_success() {
        let result = create_webauthn(&config(&["http://localhost:8080", "http://localhost:3000"]));
        assert!(result.is_ok());
    }

    #[test]
    fn create_webauthn_invalid_origin() {
        let result = create_webauthn(&config(&["not-a-valid-url"]));
        assert!(result.is_err());
    }

    #[test]
    fn create_webauthn_requires_an_origin() {
        assert!(create_webauthn(&config(&[])).is_err());
    }

    #[test]
    fn registration_options_carry_a_challenge() {
        // ---
        let webauthn = create_webauthn(&config(&["http://localhost:8080"])).unwrap();
        let verifier = WebauthnVerifier::new(webauthn);
        let user = User::new("passkey@example.com".to_string(), None);

        let start = verifier.start_registration(&user).unwrap();
        assert!(start.options["publicKey"]["challenge"].is_string());
        assert!(!start.state.is_empty());
    }

    #[test]
    fn garbage_attestation_fails_ceremony() {
        // ---
        let webauthn = create_webauthn(&config(&["http://localhost:8080"])).unwrap();
        let verifier = WebauthnVerifier::new(webauthn);
        let user = User::new("passkey@example.com".to_string(), None);
        let start = verifier.start_registration(&user).unwrap();

        let result = verifier.finish_registration(&json!({"id": "nope"}), &start.state);
        assert!(matches!(result, Err(CeremonyError::CeremonyFailed)));
    }
}
