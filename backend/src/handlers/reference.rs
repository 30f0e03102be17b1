//! HTTP handlers for reference data

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::reference::{
        BagTypeInput, CityInput, CurrencyInput, MarkInput, NameInput, ReferenceService,
    },
    AppState,
};

pub async fn list_marks(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.list_marks().await?))
}

pub async fn create_mark(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<MarkInput>,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok((StatusCode::CREATED, Json(service.create_mark(input).await?)))
}

pub async fn list_unit_types(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.list_unit_types().await?))
}

pub async fn create_unit_type(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<NameInput>,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok((StatusCode::CREATED, Json(service.create_unit_type(input).await?)))
}

pub async fn list_bag_types(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.list_bag_types().await?))
}

pub async fn create_bag_type(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<BagTypeInput>,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok((StatusCode::CREATED, Json(service.create_bag_type(input).await?)))
}

pub async fn list_currencies(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.list_currencies().await?))
}

pub async fn create_currency(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CurrencyInput>,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok((StatusCode::CREATED, Json(service.create_currency(input).await?)))
}

pub async fn list_countries(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.list_countries().await?))
}

pub async fn create_country(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<NameInput>,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok((StatusCode::CREATED, Json(service.create_country(input).await?)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCitiesQuery {
    pub country_id: Option<Uuid>,
}

pub async fn list_cities(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListCitiesQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok(Json(service.list_cities(query.country_id).await?))
}

pub async fn create_city(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CityInput>,
) -> AppResult<impl IntoResponse> {
    let service = ReferenceService::new(state.db);
    Ok((StatusCode::CREATED, Json(service.create_city(input).await?)))
}
