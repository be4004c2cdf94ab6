//! Bearer-token gate in front of the protected routes.
//!
//! A request passes only when the `Authorization` header carries
//! `Bearer <token>`, the token verifies under the deployment's codec, and the
//! token is bound to a live session. The resolved user id is attached to the
//! request extensions as [`AuthUser`].

use crate::app_state::AppState;
use crate::domain::{SessionError, SessionStorePtr, TokenCodecPtr};
use crate::handlers::ErrorResponse;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was turned away. All variants produce the same 401 body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    // ---
    #[error("missing or malformed Authorization header")]
    MissingOrMalformedCredential,

    #[error("token failed verification")]
    InvalidToken,

    #[error("token is not bound to a live session")]
    UnknownSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        // ---
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
            }),
        )
            .into_response()
    }
}

/// Authenticated user id, available to handlers behind [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // ---
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AuthRejection::MissingOrMalformedCredential)
    }
}

/// Resolves a bearer token to the user owning its session.
#[derive(Clone)]
pub struct AuthGateway {
    codec: TokenCodecPtr,
    sessions: SessionStorePtr,
}

impl AuthGateway {
    // ---
    pub fn new(codec: TokenCodecPtr, sessions: SessionStorePtr) -> Self {
        // ---
        Self { codec, sessions }
    }

    /// Pulls the token out of `Authorization: Bearer <token>`.
    ///
    /// The scheme is matched exactly, including the single space.
    pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthRejection> {
        // ---
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .filter(|token| !token.is_empty())
            .ok_or(AuthRejection::MissingOrMalformedCredential)
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthRejection> {
        // ---
        let token = Self::extract_bearer(headers)?;

        match self.codec.validate(token) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(codec = self.codec.name(), "Token did not verify");
                return Err(AuthRejection::InvalidToken);
            }
            Err(e) => {
                tracing::debug!(codec = self.codec.name(), error = %e, "Token is malformed");
                return Err(AuthRejection::InvalidToken);
            }
        }

        match self.sessions.get_user_id_by_token(token).await {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(SessionError::NotFound) => {
                tracing::debug!("Verified token has no live session");
                Err(AuthRejection::UnknownSession)
            }
            Err(SessionError::Storage(e)) => {
                tracing::error!("Session lookup failed: {:?}", e);
                Err(AuthRejection::UnknownSession)
            }
        }
    }
}

/// Middleware guarding the protected route group.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // ---
    match state.gateway().authenticate(request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => {
            state.metrics().record_auth_rejected();
            rejection.into_response()
        }
    }
}
