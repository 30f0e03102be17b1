//! HTTP handlers for the raw-material category tree

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::category::{CategoryInput, CategoryService},
    AppState,
};

/// Flat list of categories
pub async fn list_categories(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Categories assembled into a forest
pub async fn get_category_tree(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    let tree = service.category_tree().await?;
    Ok(Json(tree))
}

/// Categories eligible as a new parent for the given category
pub async fn get_parent_options(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    let options = service.parent_options(category_id).await?;
    Ok(Json(options))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Rename or re-parent a category
pub async fn update_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a leaf category
pub async fn delete_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    service.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
