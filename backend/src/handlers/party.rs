//! HTTP handlers for clients and suppliers

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
    services::party::{ClientInput, PartyService, SupplierInput},
    AppState,
};

/// List clients
pub async fn list_clients(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let clients = service.list_clients().await?;
    Ok(Json(clients))
}

/// Get a client by ID
pub async fn get_client(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let client = service.get_client(client_id).await?;
    Ok(Json(client))
}

/// Create a client
pub async fn create_client(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<ClientInput>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let client = service.create_client(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// Update a client
pub async fn update_client(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(client_id): Path<Uuid>,
    Json(input): Json<ClientInput>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let client = service.update_client(client_id, input).await?;
    Ok(Json(client))
}

/// Delete a client with no orders
pub async fn delete_client(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    service.delete_client(client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let suppliers = service.list_suppliers().await?;
    Ok(Json(suppliers))
}

/// Get a supplier by ID
pub async fn get_supplier(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let supplier = service.get_supplier(supplier_id).await?;
    Ok(Json(supplier))
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let supplier = service.create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    let supplier = service.update_supplier(supplier_id, input).await?;
    Ok(Json(supplier))
}

/// Delete a supplier with no purchases
pub async fn delete_supplier(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = PartyService::new(state.db);
    service.delete_supplier(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
