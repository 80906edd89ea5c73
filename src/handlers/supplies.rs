use super::common::{
    map_service_error, success_response, PaginatedResponse, PaginationParams,
};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use uuid::Uuid;

/// List supply items alphabetically
#[utoipa::path(
    get,
    path = "/api/v1/supplies",
    params(PaginationParams),
    responses(
        (status = 200, description = "Supply items listed")
    ),
    tag = "supplies"
)]
pub async fn list_supplies(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (items, total) = state
        .services
        .supplies
        .list_supplies(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        params.page,
        params.per_page,
        total,
    )))
}

/// Get a supply item with its current quantity on hand
#[utoipa::path(
    get,
    path = "/api/v1/supplies/{id}",
    params(
        ("id" = Uuid, Path, description = "Supply item ID")
    ),
    responses(
        (status = 200, description = "Supply item fetched"),
        (status = 404, description = "Supply item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn get_supply(
    State(state): State<AppState>,
    Path(supply_item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let item = state
        .services
        .supplies
        .get_supply(supply_item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// List supply items at or below the minimum stock floor
#[utoipa::path(
    get,
    path = "/api/v1/supplies/low-stock",
    responses(
        (status = 200, description = "Low-stock supply items listed")
    ),
    tag = "supplies"
)]
pub async fn low_stock(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .supplies
        .low_stock()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Creates the router for supply lookup endpoints
pub fn supply_routes() -> Router<AppState> {
    // "low-stock" must be registered before ":id" would otherwise shadow it
    Router::new()
        .route("/", get(list_supplies))
        .route("/low-stock", get(low_stock))
        .route("/:id", get(get_supply))
}
