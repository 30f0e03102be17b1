//! HTTP handlers for raw-material purchases

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::purchase::{PurchaseInput, PurchaseService},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListPurchasesQuery {
    pub supplier_id: Option<Uuid>,
}

/// List purchases, optionally filtered by supplier
pub async fn list_purchases(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListPurchasesQuery>,
) -> AppResult<impl IntoResponse> {
    let service = PurchaseService::new(state.db);
    let purchases = service.list_purchases(query.supplier_id).await?;
    Ok(Json(purchases))
}

/// Record a purchase
pub async fn create_purchase(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<PurchaseInput>,
) -> AppResult<impl IntoResponse> {
    let service = PurchaseService::new(state.db);
    let purchase = service.create_purchase(input).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// Get a purchase by ID
pub async fn get_purchase(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = PurchaseService::new(state.db);
    let purchase = service.get_purchase(purchase_id).await?;
    Ok(Json(purchase))
}

/// Update a purchase; totals are recomputed
pub async fn update_purchase(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<PurchaseInput>,
) -> AppResult<impl IntoResponse> {
    let service = PurchaseService::new(state.db);
    let purchase = service.update_purchase(purchase_id, input).await?;
    Ok(Json(purchase))
}

/// Delete a purchase
pub async fn delete_purchase(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = PurchaseService::new(state.db);
    service.delete_purchase(purchase_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
