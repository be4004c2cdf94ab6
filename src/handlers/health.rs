use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct HealthQuery {
    mode: Option<String>,
}

/// Pings Postgres (through the repository) then the challenge store.
///
/// Returns the name of the first backend that failed.
async fn ping_backends(state: &AppState) -> Result<(), &'static str> {
    // ---
    if let Err(e) = state.repository().ping().await {
        tracing::error!(error = ?e, "Repository health check failed");
        return Err("repository");
    }
    if let Err(e) = state.challenges().ping().await {
        tracing::error!(error = ?e, "Challenge store health check failed");
        return Err("challenge store");
    }
    Ok(())
}

/// GET /health
///
/// - No query (or `mode=light`): the process is up and serving.
/// - `mode=full`: also verifies backend connectivity; any failure yields
///   `500 { "status": "error" }`.
pub async fn health_check(
    State(state): State<AppState>,
    Query(params): Query<HealthQuery>,
) -> (StatusCode, Json<HealthResponse>) {
    // ---
    let full = params.mode.as_deref() == Some("full");
    if !full {
        return (StatusCode::OK, Json(HealthResponse { status: "ok" }));
    }

    match ping_backends(&state).await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        Err(backend) => {
            tracing::warn!(backend, "Full health check degraded");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse { status: "error" }),
            )
        }
    }
}
