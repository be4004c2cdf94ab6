// Authentication: token codecs, the bearer gate, password hashing and the
// passkey ceremonies. Modules are private, only exported symbols are public.

mod ceremony;
mod gateway;
mod hmac_codec;
mod jwt_codec;
mod password;

pub use ceremony::CeremonyOrchestrator;
pub use gateway::{require_auth, AuthGateway, AuthRejection, AuthUser};
pub use hmac_codec::{generate, HmacTokenCodec, TokenClaims, DEFAULT_HEADER};
pub use jwt_codec::JwtTokenCodec;
pub use password::{hash_password, verify_login, verify_password};

use crate::config::{AuthConfig, TokenStrategy};
use crate::domain::TokenCodecPtr;
use std::sync::Arc;

/// Builds the deployment's single token codec.
pub fn create_token_codec(config: &AuthConfig) -> TokenCodecPtr {
    // ---
    let secret = config.secret.as_bytes();
    let codec: TokenCodecPtr = match config.strategy {
        TokenStrategy::Hmac => Arc::new(
            HmacTokenCodec::new(secret, &config.issuer, &config.audience, config.token_ttl)
                .with_expiry_enforcement(config.enforce_expiry),
        ),
        TokenStrategy::Jwt => Arc::new(JwtTokenCodec::new(
            secret,
            &config.issuer,
            &config.audience,
            config.token_ttl,
            config.jwt_leeway,
        )),
    };

    tracing::info!(strategy = codec.name(), "Token codec configured");
    codec
}
