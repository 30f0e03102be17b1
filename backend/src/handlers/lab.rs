//! HTTP handlers for quality-control reports

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
    services::lab::{CreateLabInput, LabService, UpdateLabInput},
    AppState,
};

/// File a quality-control report for an order
pub async fn create_lab_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CreateLabInput>,
) -> AppResult<impl IntoResponse> {
    let service = LabService::new(state.db);
    let report = service.create_report(input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Get a quality-control report by ID
pub async fn get_lab_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = LabService::new(state.db);
    let report = service.get_report(report_id).await?;
    Ok(Json(report))
}

/// Update sample measurements on a report
pub async fn update_lab_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(report_id): Path<Uuid>,
    Json(input): Json<UpdateLabInput>,
) -> AppResult<impl IntoResponse> {
    let service = LabService::new(state.db);
    let report = service.update_report(report_id, input).await?;
    Ok(Json(report))
}
