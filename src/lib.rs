// src/lib.rs
use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use handlers::*;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod auth;
mod config;
mod handlers;
mod infrastructure;
mod session;

pub use app_state::AppState;
pub use config::*;

// Hoist up only the public symbol(s)
pub use auth::{
    create_token_codec, generate, hash_password, verify_login, verify_password, AuthGateway,
    AuthRejection, AuthUser, CeremonyOrchestrator, HmacTokenCodec, JwtTokenCodec, TokenClaims,
    DEFAULT_HEADER,
};
pub use handlers::{ApiResponse, ErrorResponse};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    connect_with_retry, // ---
    create_memory_challenge_store,
    create_memory_repository,
    create_memory_session_store,
    create_noop_metrics,
    create_postgres_repository,
    create_postgres_session_store,
    create_prom_metrics,
    create_redis_challenge_store,
    create_webauthn,
    create_webauthn_verifier,
    spawn_session_sweeper,
    sweep_once,
    MemoryChallengeStore,
    MemoryRepository,
    MemorySessionStore,
    WebauthnVerifier,
};

/// Initializes the global tracing subscriber from `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    // ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

/// Builds the production state from configuration: metrics backend, token
/// codec, passkey verifier and the storage backends.
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    // ---
    let metrics = if config.server.metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    let codec = create_token_codec(&config.auth);
    let verifier = create_webauthn_verifier(&config.webauthn)?;

    let (repository, sessions, challenges) = match &config.storage {
        StorageConfig::Postgres { database, redis } => {
            let pool = connect_with_retry(database).await?;
            let redis_client = redis::Client::open(redis.url.clone())?;
            (
                create_postgres_repository(pool.clone()),
                create_postgres_session_store(pool),
                create_redis_challenge_store(redis_client, config.webauthn.challenge_ttl),
            )
        }
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on restart");
            (
                create_memory_repository(),
                create_memory_session_store(),
                create_memory_challenge_store(config.webauthn.challenge_ttl),
            )
        }
    };

    Ok(AppState::new(
        repository, sessions, challenges, codec, verifier, metrics,
    ))
}

/// CORS policy for the browser frontend.
///
/// Only the listed origins may call the API; they are the same origins the
/// passkey ceremonies accept.
///
/// # Errors
/// Returns an error if an origin is not a valid header value.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    // ---
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin {origin:?}: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

/// Build the HTTP router around an already-assembled state.
///
/// CORS is the outermost layer so preflight requests never reach the auth gate.
pub fn create_router(app_state: AppState, cors: CorsLayer) -> Router {
    // ---
    let public = Router::new()
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
        .route("/users/webauthn/signup/begin", post(passkey_signup_begin))
        .route("/users/webauthn/signup/finish", post(passkey_signup_finish))
        .route("/users/webauthn/login/begin", post(passkey_login_begin))
        .route("/users/webauthn/login/finish", post(passkey_login_finish));

    let protected = Router::new()
        .route("/users/logout", post(logout))
        .route("/categories", get(list_categories))
        .route("/categories/new", post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
        .route("/operations", get(list_operations))
        .route("/operations/new", post(create_operation))
        .route("/operations/{id}", put(update_operation).delete(delete_operation))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", public.merge(protected))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            track_http_metrics,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Runs the server until SIGINT/SIGTERM, then drains connections and stops
/// the session sweeper.
pub async fn serve(config: AppConfig) -> Result<()> {
    // ---
    let app_state = build_state(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_session_sweeper(
        Arc::clone(app_state.sessions()),
        Arc::clone(app_state.metrics()),
        config.session.clone(),
        shutdown_rx,
    );

    let router = create_router(app_state, cors_layer(&config.webauthn.origins)?);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;

    tracing::info!("Starting at endpoint:{}", config.server.bind_addr);
    tracing::info!("Starting Expense Tracker API server v{}...", env!("CARGO_PKG_VERSION"));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    if let Err(e) = sweeper.await {
        tracing::warn!("Session sweeper ended abnormally: {:?}", e);
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
