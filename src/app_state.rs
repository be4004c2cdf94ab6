//! Application state management.
//!
//! `AppState` is the dependency-injection container handed to every Axum
//! handler through the `State` extractor. Every backend sits behind a trait
//! object so the same router runs against PostgreSQL/Redis in production and
//! in-memory stores in tests.
//!
//! The state is cheaply cloneable: each field is an `Arc` or wraps one.

use crate::auth::{AuthGateway, CeremonyOrchestrator};
use crate::domain::{
    ChallengeStorePtr, MetricsPtr, PasskeyVerifierPtr, RepositoryPtr, SessionStorePtr,
    TokenCodecPtr,
};
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// # Lifecycle
///
/// 1. Built once at startup (`build_state`) or by a test harness
/// 2. Attached to the router via `.with_state(app_state)`
/// 3. Cloned by Axum for each incoming request
#[derive(Clone)]
pub struct AppState {
    /// Users, categories and operations.
    repository: RepositoryPtr,

    /// One live session per user.
    sessions: SessionStorePtr,

    /// Ceremony state and passkeys. Held here as well for the full health check.
    challenges: ChallengeStorePtr,

    /// The deployment's single token strategy.
    codec: TokenCodecPtr,

    gateway: AuthGateway,

    ceremony: Arc<CeremonyOrchestrator>,

    /// Either Prometheus-backed or no-op.
    metrics: MetricsPtr,
}

impl AppState {
    // ---

    pub fn new(
        repository: RepositoryPtr,
        sessions: SessionStorePtr,
        challenges: ChallengeStorePtr,
        codec: TokenCodecPtr,
        verifier: PasskeyVerifierPtr,
        metrics: MetricsPtr,
    ) -> Self {
        // ---
        let gateway = AuthGateway::new(codec.clone(), sessions.clone());
        let ceremony = Arc::new(CeremonyOrchestrator::new(verifier, challenges.clone()));

        AppState {
            repository,
            sessions,
            challenges,
            codec,
            gateway,
            ceremony,
            metrics,
        }
    }

    pub(crate) fn repository(&self) -> &RepositoryPtr {
        &self.repository
    }

    pub(crate) fn sessions(&self) -> &SessionStorePtr {
        &self.sessions
    }

    pub(crate) fn challenges(&self) -> &ChallengeStorePtr {
        &self.challenges
    }

    pub(crate) fn codec(&self) -> &TokenCodecPtr {
        &self.codec
    }

    pub(crate) fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    pub(crate) fn ceremony(&self) -> &CeremonyOrchestrator {
        &self.ceremony
    }

    pub(crate) fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }
}
