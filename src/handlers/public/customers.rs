// handlers/public/customers.rs - POST /customers handler
//
// Customer creation is the one customer route open to anonymous callers.

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{rules, JsonInput};
use crate::state::AppState;

/**
 * POST /customers - Create a customer
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "string",       // Required, at most 255 characters
 *   "email": "string",      // Required, valid, unique among customers
 *   "phone": "string",      // Optional, at most 20 characters
 *   "address": "string"     // Optional, at most 255 characters
 * }
 * ```
 *
 * Expected Output (201):
 * ```json
 * { "status": true, "message": "Customer created Successfully", "data": { ... } }
 * ```
 */
pub async fn customer_create(
    State(state): State<AppState>,
    JsonInput(input): JsonInput,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let customers = state.stores.customers.as_ref();
    let customer = customers.insert_customer(rules::new_customer(&input, customers).await?).await?;

    tracing::info!(customer_id = customer.id, "Created customer");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": true,
            "message": "Customer created Successfully",
            "data": customer,
        })),
    ))
}
