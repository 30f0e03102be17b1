//! HTTP handlers for authentication

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::auth::{AuthService, LoginInput, RegisterInput},
    AppState,
};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(state.db, &state.config);
    let user = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in and obtain an access token
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(input).await?;
    Ok(Json(tokens))
}

/// Profile of the authenticated user
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(state.db, &state.config);
    let profile = service.me(user.0.user_id).await?;
    Ok(Json(profile))
}
