//! HTTP handlers for shipments and shipment reports

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
    services::shipment::{
        CreateReportInput, CreateShipmentInput, ShipmentService, UpdateReportInput,
    },
    AppState,
};

/// Pack a shipment against an order
pub async fn create_shipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CreateShipmentInput>,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let shipment = service.create_shipment(input).await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// List all shipments
pub async fn list_shipments(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let shipments = service.list_shipments().await?;
    Ok(Json(shipments))
}

/// Get a shipment by ID
pub async fn get_shipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let shipment = service.get_shipment(shipment_id).await?;
    Ok(Json(shipment))
}

/// Mark a packed shipment as loaded onto a vehicle
pub async fn load_shipment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let shipment = service.mark_loaded(shipment_id).await?;
    Ok(Json(shipment))
}

/// File a shipment report; moves the order into shipping
pub async fn create_shipment_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateReportInput>,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let report = service.create_report(input, user.0.role).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// List all shipment reports
pub async fn list_shipment_reports(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let reports = service.list_reports().await?;
    Ok(Json(reports))
}

/// Get a shipment report by ID
pub async fn get_shipment_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let report = service.get_report(report_id).await?;
    Ok(Json(report))
}

/// Update a shipment report as the vehicle travels
pub async fn update_shipment_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(report_id): Path<Uuid>,
    Json(input): Json<UpdateReportInput>,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let report = service.update_report(report_id, input).await?;
    Ok(Json(report))
}
