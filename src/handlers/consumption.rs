use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::consumption::{EventStatus, EventType, NewConsumption, NewConsumptionLine},
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Request DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateConsumptionRequest {
    /// "health" or "feeding"
    #[validate(length(min = 1))]
    pub event_type: String,
    pub animal_id: Uuid,
    /// Event date in `YYYY-MM-DD` format
    #[validate(length(min = 1))]
    pub event_date: String,
    #[validate(length(min = 1, message = "at least one line item is required"))]
    pub lines: Vec<ConsumptionLineRequest>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConsumptionLineRequest {
    pub supply_item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    /// "pending" or "completed"
    #[validate(length(min = 1))]
    pub status: String,
}

// Pagination fields are inlined rather than flattened from PaginationParams:
// serde_urlencoded cannot deserialize numbers through #[serde(flatten)].
#[derive(Debug, Deserialize, Serialize)]
pub struct EventListParams {
    /// Optional filter: "health" or "feeding"
    pub event_type: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

// Handler functions

/// Record a consumption event (health treatment or feeding)
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateConsumptionRequest,
    responses(
        (status = 201, description = "Event recorded, stock debited", body = serde_json::Value),
        (status = 400, description = "Invalid lines or insufficient stock above the minimum floor", body = crate::errors::ErrorResponse),
        (status = 404, description = "Animal or supply item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate line item", body = crate::errors::ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<CreateConsumptionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let event_type: EventType = payload
        .event_type
        .parse()
        .map_err(map_service_error)?;
    let event_date = NaiveDate::parse_from_str(&payload.event_date, "%Y-%m-%d")
        .map_err(|e| ApiError::ValidationError(format!("Invalid date format: {}", e)))?;

    let lines = payload
        .lines
        .into_iter()
        .map(|line| NewConsumptionLine {
            supply_item_id: line.supply_item_id,
            quantity: line.quantity,
        })
        .collect();

    let details = state
        .services
        .consumption
        .record_consumption(NewConsumption {
            event_type,
            animal_id: payload.animal_id,
            event_date,
            notes: payload.notes,
            lines,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(details))
}

/// Get a consumption event by ID
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event fetched", body = serde_json::Value),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let details = state
        .services
        .consumption
        .get_event(event_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(details))
}

/// List consumption events, newest first, optionally filtered by type
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(
        ("event_type" = Option<String>, Query, description = "Filter by event type: health or feeding"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Events listed")
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let event_type = params
        .event_type
        .as_deref()
        .map(str::parse::<EventType>)
        .transpose()
        .map_err(map_service_error)?;

    let (events, total) = state
        .services
        .consumption
        .list_events(event_type, params.page, params.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        events,
        params.page,
        params.per_page,
        total,
    )))
}

/// Change an event's status; line items and stock are untouched
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}/status",
    request_body = UpdateStatusRequest,
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "events"
)]
pub async fn update_event_status(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let status: EventStatus = payload.status.parse().map_err(map_service_error)?;

    let updated = state
        .services
        .consumption
        .update_status(event_id, status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(updated))
}

/// Reverse a consumption event: credits the debited stock back and soft-deletes the record
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event reversed, stock restored"),
        (status = 404, description = "Event not found or already reversed", body = crate::errors::ErrorResponse)
    ),
    tag = "events"
)]
pub async fn reverse_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .consumption
        .reverse_consumption(event_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "id": event_id,
        "message": "Consumption event reversed"
    })))
}

/// Creates the router for consumption event endpoints
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event))
        .route("/", get(list_events))
        .route("/:id", get(get_event))
        .route("/:id", delete(reverse_event))
        .route("/:id/status", put(update_event_status))
}
