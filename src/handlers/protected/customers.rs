// handlers/protected/customers.rs - Customer endpoints behind the auth gate

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::database::models::Customer;
use crate::error::ApiError;
use crate::handlers::{parse_id, rules, JsonInput};
use crate::state::AppState;

const NOT_FOUND: &str = "Customer not found";

/// Resolve `{id}` to a stored customer or the customer 404
async fn load_customer(state: &AppState, raw_id: &str) -> Result<Customer, ApiError> {
    let id = parse_id(raw_id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    state
        .stores
        .customers
        .find_customer(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// GET /customers - All customers, ordered by id
pub async fn customer_index(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let customers = state.stores.customers.list_customers().await?;

    Ok(Json(json!({
        "message": "Record found",
        "data": customers,
    })))
}

/// GET /customers/:id
pub async fn customer_show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let customer = load_customer(&state, &id).await?;

    Ok(Json(json!({
        "message": "Customer's Record found",
        "data": customer,
    })))
}

/**
 * PUT /customers/:id - Partial update
 *
 * Only submitted fields are validated and changed. `phone` and `address`
 * accept null to clear the stored value. The email uniqueness check skips
 * this customer's own row.
 *
 * Expected Output:
 * ```json
 * { "status": true, "message": "Customer updated Successfully", "data": { ... } }
 * ```
 */
pub async fn customer_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonInput(input): JsonInput,
) -> Result<Json<Value>, ApiError> {
    let existing = load_customer(&state, &id).await?;
    let customers = state.stores.customers.as_ref();
    let changes = rules::customer_changes(&input, existing.id, customers).await?;

    let customer = customers
        .update_customer(existing.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(customer_id = customer.id, "Updated customer");

    Ok(Json(json!({
        "status": true,
        "message": "Customer updated Successfully",
        "data": customer,
    })))
}

/// DELETE /customers/:id - Removes the customer together with its orders
pub async fn customer_destroy(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    if !state.stores.customers.delete_customer(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!(customer_id = id, "Deleted customer");

    Ok(Json(json!({ "message": "Customer deleted successfully" })))
}

/**
 * GET /customers/:id/orders - Customer with all of its orders
 *
 * Expected Output:
 * ```json
 * {
 *   "status": true,
 *   "message": "Customer and Orders retrieved successfully",
 *   "data": {
 *     "customer": { "id": 1, "name": "Jane Doe", ... },
 *     "orders": [ { "id": 3, "customer_id": 1, "total": "100.00", ... } ]
 *   }
 * }
 * ```
 */
pub async fn customer_with_orders(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let customer = load_customer(&state, &id).await?;
    let orders = state.stores.orders.list_orders_for_customer(customer.id).await?;

    Ok(Json(json!({
        "status": true,
        "message": "Customer and Orders retrieved successfully",
        "data": {
            "customer": customer,
            "orders": orders,
        },
    })))
}
