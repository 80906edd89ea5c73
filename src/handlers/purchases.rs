use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::purchases::{NewPurchase, NewPurchaseLine},
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Request DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseRequest {
    pub supplier_id: Uuid,
    /// Purchase date in `YYYY-MM-DD` format
    #[validate(length(min = 1))]
    pub purchase_date: String,
    #[validate(length(min = 1, message = "at least one line item is required"))]
    pub lines: Vec<PurchaseLineRequest>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseLineRequest {
    pub supply_item_id: Uuid,
    pub unit_price: Decimal,
    pub quantity: Decimal,
}

// Handler functions

/// Record a purchase
#[utoipa::path(
    post,
    path = "/api/v1/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded, stock credited", body = serde_json::Value),
        (status = 400, description = "Invalid line items", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier or supply item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate line item", body = crate::errors::ErrorResponse)
    ),
    tag = "purchases"
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let purchase_date = NaiveDate::parse_from_str(&payload.purchase_date, "%Y-%m-%d")
        .map_err(|e| ApiError::ValidationError(format!("Invalid date format: {}", e)))?;

    let lines = payload
        .lines
        .into_iter()
        .map(|line| NewPurchaseLine {
            supply_item_id: line.supply_item_id,
            unit_price: line.unit_price,
            quantity: line.quantity,
        })
        .collect();

    let details = state
        .services
        .purchases
        .record_purchase(NewPurchase {
            supplier_id: payload.supplier_id,
            purchase_date,
            notes: payload.notes,
            lines,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(details))
}

/// Get a purchase by ID, including its derived total
#[utoipa::path(
    get,
    path = "/api/v1/purchases/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase ID")
    ),
    responses(
        (status = 200, description = "Purchase fetched", body = serde_json::Value),
        (status = 404, description = "Purchase not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchases"
)]
pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let details = state
        .services
        .purchases
        .get_purchase(purchase_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(details))
}

/// List purchases, newest first
#[utoipa::path(
    get,
    path = "/api/v1/purchases",
    params(PaginationParams),
    responses(
        (status = 200, description = "Purchases listed")
    ),
    tag = "purchases"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (purchases, total) = state
        .services
        .purchases
        .list_purchases(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        purchases,
        params.page,
        params.per_page,
        total,
    )))
}

/// Reverse a purchase: debits the credited stock back and soft-deletes the record
#[utoipa::path(
    delete,
    path = "/api/v1/purchases/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase ID")
    ),
    responses(
        (status = 200, description = "Purchase reversed, stock restored"),
        (status = 400, description = "Reversal would drive stock below zero", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase not found or already reversed", body = crate::errors::ErrorResponse)
    ),
    tag = "purchases"
)]
pub async fn reverse_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .purchases
        .reverse_purchase(purchase_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "id": purchase_id,
        "message": "Purchase reversed"
    })))
}

/// Creates the router for purchase endpoints
pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase))
        .route("/", get(list_purchases))
        .route("/:id", get(get_purchase))
        .route("/:id", delete(reverse_purchase))
}
