use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    // ---
    /// The token does not have the expected structure (segment count).
    #[error("malformed token")]
    MalformedToken,

    /// Claims could not be serialized or signed.
    #[error("token encoding failed: {0}")]
    EncodingFailure(String),
}

/// Issues and verifies signed, time-bound bearer tokens.
///
/// Exactly one implementation is wired per deployment.
///
/// `validate` distinguishes two failure modes: `Err` for structurally broken
/// input and `Ok(false)` for a well-formed token that does not verify.
pub trait TokenCodec: Send + Sync + 'static {
    // ---
    /// Short strategy name for logs ("hmac" or "jwt").
    fn name(&self) -> &'static str;

    /// Issues a fresh token valid for the configured lifetime.
    fn issue(&self) -> Result<String, TokenError>;

    fn validate(&self, token: &str) -> Result<bool, TokenError>;
}

/// Type alias for the deployment's token codec.
pub type TokenCodecPtr = Arc<dyn TokenCodec>;
