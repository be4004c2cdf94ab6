//! Operation (expense / income entry) CRUD for the authenticated user.

use super::shared_types::{api_error, internal_error, is_valid_currency, ApiError, ApiResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Operation, OperationInput};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

fn storage_error(e: anyhow::Error) -> ApiError {
    tracing::error!("Operation storage failure: {}", e);
    internal_error()
}

/// Field checks plus: the category must belong to the caller.
async fn validate(state: &AppState, user_id: Uuid, input: &OperationInput) -> Result<(), ApiError> {
    // ---
    if input.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Operation name is required"));
    }
    if input.amount < 0 {
        return Err(api_error(StatusCode::BAD_REQUEST, "Amount must not be negative"));
    }
    if !is_valid_currency(&input.currency) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid currency code"));
    }

    let category = state
        .repository()
        .get_category(user_id, input.category_id)
        .await
        .map_err(storage_error)?;
    if category.is_none() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Unknown category"));
    }
    Ok(())
}

/// GET /api/v1/operations
///
/// Newest first.
#[tracing::instrument(skip(state))]
pub async fn list_operations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<Vec<Operation>>, ApiError> {
    // ---
    let operations = state
        .repository()
        .get_operations(user_id)
        .await
        .map_err(storage_error)?;

    Ok(ApiResponse { data: operations })
}

/// POST /api/v1/operations/new
#[tracing::instrument(skip(state, input))]
pub async fn create_operation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<OperationInput>,
) -> Result<(StatusCode, ApiResponse<Operation>), ApiError> {
    // ---
    validate(&state, user_id, &input).await?;
    let operation = Operation::new(user_id, input);

    state
        .repository()
        .create_operation(&operation)
        .await
        .map_err(storage_error)?;

    tracing::info!(operation_id = %operation.id, "Operation created");
    Ok((StatusCode::CREATED, ApiResponse { data: operation }))
}

/// PUT /api/v1/operations/{id}
#[tracing::instrument(skip(state, input))]
pub async fn update_operation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<OperationInput>,
) -> Result<ApiResponse<Operation>, ApiError> {
    // ---
    validate(&state, user_id, &input).await?;

    let updated = state
        .repository()
        .update_operation(user_id, id, input)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Operation not found"))?;

    Ok(ApiResponse { data: updated })
}

/// DELETE /api/v1/operations/{id}
#[tracing::instrument(skip(state))]
pub async fn delete_operation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    // ---
    let deleted = state
        .repository()
        .delete_operation(user_id, id)
        .await
        .map_err(storage_error)?;

    if !deleted {
        return Err(api_error(StatusCode::NOT_FOUND, "Operation not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
