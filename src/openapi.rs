use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Finca API",
        version = "1.0.0",
        description = r#"
# Farm Supply Stock API

Supply (insumo) stock accounting for a livestock farm.

- **Purchases** credit supply stock; the monetary total is derived from
  line items on every read, never stored.
- **Consumption events** (health treatments, feedings) debit stock and are
  rejected when they would leave a supply item below the minimum floor.
- **Reversals** soft-delete a record and apply the inverse stock adjustment
  in the same transaction.

## Error Handling

Errors use a consistent JSON body with appropriate status codes:

```json
{
  "error": "Bad Request",
  "message": "Insufficient stock: ...",
  "timestamp": "2026-03-09T10:30:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `per_page` (default 20).
        "#
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "purchases", description = "Purchase recording and reversal"),
        (name = "events", description = "Consumption events (health, feeding)"),
        (name = "supplies", description = "Supply stock lookups")
    ),
    paths(
        // Purchases
        crate::handlers::purchases::create_purchase,
        crate::handlers::purchases::get_purchase,
        crate::handlers::purchases::list_purchases,
        crate::handlers::purchases::reverse_purchase,

        // Consumption events
        crate::handlers::consumption::create_event,
        crate::handlers::consumption::get_event,
        crate::handlers::consumption::list_events,
        crate::handlers::consumption::update_event_status,
        crate::handlers::consumption::reverse_event,

        // Supplies
        crate::handlers::supplies::list_supplies,
        crate::handlers::supplies::get_supply,
        crate::handlers::supplies::low_stock,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,

            crate::handlers::purchases::CreatePurchaseRequest,
            crate::handlers::purchases::PurchaseLineRequest,

            crate::handlers::consumption::CreateConsumptionRequest,
            crate::handlers::consumption::ConsumptionLineRequest,
            crate::handlers::consumption::UpdateStatusRequest,
            crate::services::consumption::EventType,
            crate::services::consumption::EventStatus,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
