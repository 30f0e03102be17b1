//! HTTP handlers for recipes

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
    services::recipe::{CreateRecipeInput, RecipeService, UpdateRecipeInput},
    AppState,
};

/// Attach a recipe to an order
pub async fn create_recipe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<impl IntoResponse> {
    let service = RecipeService::new(state.db);
    let recipe = service.create_recipe(input).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Get a recipe by ID
pub async fn get_recipe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = RecipeService::new(state.db);
    let recipe = service.get_recipe(recipe_id).await?;
    Ok(Json(recipe))
}

/// Update a recipe while the order is not yet in production
pub async fn update_recipe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<impl IntoResponse> {
    let service = RecipeService::new(state.db);
    let recipe = service.update_recipe(recipe_id, input).await?;
    Ok(Json(recipe))
}

/// Delete a recipe while the order is not yet in production
pub async fn delete_recipe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = RecipeService::new(state.db);
    service.delete_recipe(recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
