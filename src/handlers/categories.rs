//! Category CRUD for the authenticated user.

use super::shared_types::{api_error, internal_error, ApiError, ApiResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Category, CategoryInput};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

fn validate(input: &CategoryInput) -> Result<(), ApiError> {
    // ---
    if input.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Category name is required"));
    }
    Ok(())
}

fn storage_error(e: anyhow::Error) -> ApiError {
    tracing::error!("Category storage failure: {}", e);
    internal_error()
}

/// GET /api/v1/categories
#[tracing::instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    // ---
    let categories = state
        .repository()
        .get_categories(user_id)
        .await
        .map_err(storage_error)?;

    Ok(ApiResponse { data: categories })
}

/// POST /api/v1/categories/new
#[tracing::instrument(skip(state, input))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, ApiResponse<Category>), ApiError> {
    // ---
    validate(&input)?;
    let category = Category::new(user_id, input);

    state
        .repository()
        .create_category(&category)
        .await
        .map_err(storage_error)?;

    tracing::info!(category_id = %category.id, "Category created");
    Ok((StatusCode::CREATED, ApiResponse { data: category }))
}

/// PUT /api/v1/categories/{id}
#[tracing::instrument(skip(state, input))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<ApiResponse<Category>, ApiError> {
    // ---
    validate(&input)?;

    let updated = state
        .repository()
        .update_category(user_id, id, input)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Category not found"))?;

    Ok(ApiResponse { data: updated })
}

/// DELETE /api/v1/categories/{id}
///
/// Operations filed under the category are removed with it.
#[tracing::instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    // ---
    let deleted = state
        .repository()
        .delete_category(user_id, id)
        .await
        .map_err(storage_error)?;

    if !deleted {
        return Err(api_error(StatusCode::NOT_FOUND, "Category not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
