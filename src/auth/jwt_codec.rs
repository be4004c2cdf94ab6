//! Standard HS256 JWT strategy.

use crate::domain::{TokenCodec, TokenError};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Issues and validates JWTs with issuer, audience and expiry checks.
pub struct JwtTokenCodec {
    // ---
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    leeway: Duration,
}

impl JwtTokenCodec {
    // ---
    pub fn new(
        secret: &[u8],
        issuer: &str,
        audience: &str,
        ttl: Duration,
        leeway: Duration,
    ) -> Self {
        // ---
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl,
            leeway,
        }
    }

    fn validation(&self) -> Validation {
        // ---
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway.as_secs();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation
    }
}

impl TokenCodec for JwtTokenCodec {
    // ---
    fn name(&self) -> &'static str {
        "jwt"
    }

    fn issue(&self) -> Result<String, TokenError> {
        // ---
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|e| TokenError::EncodingFailure(e.to_string()))?;
        let claims = JwtClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + ttl,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailure(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<bool, TokenError> {
        // ---
        match decode::<JwtClaims>(token, &self.decoding_key, &self.validation()) {
            Ok(_) => Ok(true),
            Err(e) => match e.kind() {
                ErrorKind::InvalidToken => Err(TokenError::MalformedToken),
                other => {
                    tracing::debug!(reason = ?other, "JWT rejected");
                    Ok(false)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"jwt-test-secret";

    fn codec() -> JwtTokenCodec {
        JwtTokenCodec::new(
            SECRET,
            "backend.exptr",
            "frontend.exptr",
            Duration::from_secs(3600),
            Duration::from_secs(30),
        )
    }

    fn token_expiring_in(seconds: i64, issuer: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            iss: issuer.to_string(),
            aud: "frontend.exptr".to_string(),
            iat: now - 3600,
            exp: now + seconds,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    #[test]
    fn issued_token_validates() {
        // ---
        let codec = codec();
        let token = codec.issue().unwrap();
        assert_eq!(codec.validate(&token), Ok(true));
        assert_eq!(codec.name(), "jwt");
    }

    #[test]
    fn wrong_secret_rejected() {
        // ---
        let token = codec().issue().unwrap();
        let other = JwtTokenCodec::new(
            b"other",
            "backend.exptr",
            "frontend.exptr",
            Duration::from_secs(3600),
            Duration::from_secs(30),
        );
        assert_eq!(other.validate(&token), Ok(false));
    }

    #[test]
    fn expired_beyond_leeway_rejected() {
        // ---
        let token = token_expiring_in(-120, "backend.exptr");
        assert_eq!(codec().validate(&token), Ok(false));
    }

    #[test]
    fn expired_within_leeway_accepted() {
        // ---
        let token = token_expiring_in(-5, "backend.exptr");
        assert_eq!(codec().validate(&token), Ok(true));
    }

    #[test]
    fn wrong_issuer_rejected() {
        // ---
        let token = token_expiring_in(600, "someone.else");
        assert_eq!(codec().validate(&token), Ok(false));
    }

    #[test]
    fn structurally_broken_token_is_malformed() {
        // ---
        assert_eq!(codec().validate("not-a-jwt"), Err(TokenError::MalformedToken));
    }
}
