//! HTTP handlers for production orders

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
    services::order::{CreateOrderInput, OrderActionInput, OrderService, UpdateOrderInput},
    services::{JournalService, LabService, RecipeService, ShipmentService},
    AppState,
};
use shared::models::ProductionOrderStatus;

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<ProductionOrderStatus>,
}

/// List production orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders(query.status).await?;
    Ok(Json(orders))
}

/// Create a draft production order
pub async fn create_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    let order = service.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get a production order by ID
pub async fn get_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    let order = service.get_order_expanded(order_id).await?;
    Ok(Json(order))
}

/// Update a draft production order
pub async fn update_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    let order = service.update_order(order_id, input).await?;
    Ok(Json(order))
}

/// Delete a draft or rejected production order
pub async fn delete_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    service.delete_order(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request a status transition on an order
pub async fn apply_order_action(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<OrderActionInput>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    let order = service
        .apply_action(order_id, input.action, input.reason.as_deref(), user.0.role)
        .await?;
    Ok(Json(order))
}

/// Actions currently legal for an order
pub async fn get_permitted_actions(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    let actions = service.permitted_actions(order_id).await?;
    Ok(Json(actions))
}

/// Recipe attached to an order, if any
pub async fn get_order_recipe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = RecipeService::new(state.db);
    let recipe = service.get_recipe_by_order(order_id).await?;
    Ok(Json(recipe))
}

/// Production journal entries for an order
pub async fn list_order_journal(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = JournalService::new(state.db);
    let entries = service.list_by_order(order_id).await?;
    Ok(Json(entries))
}

/// Quality-control reports for an order
pub async fn list_order_qa(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = LabService::new(state.db);
    let reports = service.list_by_order(order_id).await?;
    Ok(Json(reports))
}

/// Shipments packed against an order
pub async fn list_order_shipments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ShipmentService::new(state.db);
    let shipments = service.list_by_order(order_id).await?;
    Ok(Json(shipments))
}
