//! Self-signed HMAC-SHA256 bearer tokens.
//!
//! Wire format:
//! `base64(header) "." base64(claims_json) "." base64(hmac(header || claims_json))`
//!
//! The MAC covers the *decoded* header and claims bytes, concatenated with no
//! separator. All segments use the standard padded base64 alphabet.

use crate::domain::{TokenCodec, TokenError};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Header segment written by [`HmacTokenCodec::issue`].
pub const DEFAULT_HEADER: &str = "HS256";

/// Claims carried in the middle segment.
///
/// Field order is the serialized key order (lexicographic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    // ---
    pub aud: String,

    /// Unix seconds, string-encoded.
    pub exp: String,

    pub iss: String,

    /// Random id keeping tokens issued within the same second distinct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Builds a signed token from an explicit header, claims and secret.
///
/// # Errors
/// [`TokenError::EncodingFailure`] if the claims cannot be serialized.
pub fn generate(header: &str, claims: &TokenClaims, secret: &[u8]) -> Result<String, TokenError> {
    // ---
    let claims_json =
        serde_json::to_vec(claims).map_err(|e| TokenError::EncodingFailure(e.to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| TokenError::EncodingFailure(e.to_string()))?;
    mac.update(header.as_bytes());
    mac.update(&claims_json);
    let signature = mac.finalize().into_bytes();

    Ok(format!(
        "{}.{}.{}",
        STANDARD.encode(header.as_bytes()),
        STANDARD.encode(&claims_json),
        STANDARD.encode(signature)
    ))
}

/// Custom HMAC token strategy.
pub struct HmacTokenCodec {
    // ---
    secret: Vec<u8>,
    issuer: String,
    audience: String,
    ttl: Duration,
    enforce_expiry: bool,
}

impl HmacTokenCodec {
    // ---
    pub fn new(secret: &[u8], issuer: &str, audience: &str, ttl: Duration) -> Self {
        // ---
        Self {
            secret: secret.to_vec(),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl,
            enforce_expiry: true,
        }
    }

    /// When disabled, `exp` is advisory and only the signature is checked.
    pub fn with_expiry_enforcement(mut self, enforce: bool) -> Self {
        // ---
        self.enforce_expiry = enforce;
        self
    }

    fn is_expired(payload: &[u8]) -> bool {
        // ---
        let Ok(claims) = serde_json::from_slice::<TokenClaims>(payload) else {
            return true;
        };
        match claims.exp.parse::<i64>() {
            Ok(exp) => exp <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }
}

impl TokenCodec for HmacTokenCodec {
    // ---
    fn name(&self) -> &'static str {
        "hmac"
    }

    fn issue(&self) -> Result<String, TokenError> {
        // ---
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|e| TokenError::EncodingFailure(e.to_string()))?;
        let claims = TokenClaims {
            aud: self.audience.clone(),
            exp: (Utc::now().timestamp() + ttl).to_string(),
            iss: self.issuer.clone(),
            jti: Some(Uuid::new_v4().to_string()),
        };

        generate(DEFAULT_HEADER, &claims, &self.secret)
    }

    fn validate(&self, token: &str) -> Result<bool, TokenError> {
        // ---
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(TokenError::MalformedToken);
        };

        let (Ok(header), Ok(payload), Ok(signature)) = (
            STANDARD.decode(header),
            STANDARD.decode(payload),
            STANDARD.decode(signature),
        ) else {
            return Ok(false);
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            return Ok(false);
        };
        mac.update(&header);
        mac.update(&payload);
        if mac.verify_slice(&signature).is_err() {
            return Ok(false);
        }

        if self.enforce_expiry && Self::is_expired(&payload) {
            tracing::debug!("Rejecting expired token");
            return Ok(false);
        }

        Ok(true)
    }
}
