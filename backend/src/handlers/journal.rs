//! HTTP handlers for the production journal

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
    services::journal::{CreateJournalInput, JournalService, UpdateJournalInput},
    AppState,
};

/// Record a daily production journal entry
pub async fn create_journal_entry(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CreateJournalInput>,
) -> AppResult<impl IntoResponse> {
    let service = JournalService::new(state.db);
    let entry = service.create_entry(input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Get a journal entry by ID
pub async fn get_journal_entry(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = JournalService::new(state.db);
    let entry = service.get_entry(entry_id).await?;
    Ok(Json(entry))
}

/// Correct a journal entry
pub async fn update_journal_entry(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(entry_id): Path<Uuid>,
    Json(input): Json<UpdateJournalInput>,
) -> AppResult<impl IntoResponse> {
    let service = JournalService::new(state.db);
    let entry = service.update_entry(entry_id, input).await?;
    Ok(Json(entry))
}
