// handlers/protected/orders.rs - Order CRUD
//
// Orders respond with bare records (no message envelope). Unknown ids on
// show/update/delete answer 404 {"message":"Order not found"}.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::models::Order;
use crate::error::ApiError;
use crate::handlers::{parse_id, rules, JsonInput};
use crate::state::AppState;

const NOT_FOUND: &str = "Order not found";

fn order_id(raw: &str) -> Result<i64, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// GET /orders - Bare array of every order
pub async fn order_index(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.stores.orders.list_orders().await?))
}

/**
 * POST /orders - Create an order
 *
 * Expected Input:
 * ```json
 * {
 *   "customer_id": 1,             // Required, existing customer
 *   "order_date": "2024-05-30",   // Required, valid date
 *   "status": "pending",          // Required
 *   "total": "100.00"             // Required, numeric
 * }
 * ```
 *
 * Expected Output (201): the stored order
 */
pub async fn order_store(
    State(state): State<AppState>,
    JsonInput(input): JsonInput,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let fields = rules::order_fields(&input, state.stores.customers.as_ref()).await?;
    let order = state.stores.orders.insert_order(fields).await?;

    tracing::info!(order_id = order.id, customer_id = order.customer_id, "Created order");

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/:id
pub async fn order_show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>, ApiError> {
    let order = state
        .stores
        .orders
        .find_order(order_id(&id)?)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(order))
}

/// PUT /orders/:id - Replaces all four writable fields; each is required
pub async fn order_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonInput(input): JsonInput,
) -> Result<Json<Order>, ApiError> {
    let id = order_id(&id)?;
    if state.stores.orders.find_order(id).await?.is_none() {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let fields = rules::order_fields(&input, state.stores.customers.as_ref()).await?;
    let order = state
        .stores
        .orders
        .update_order(id, fields)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(order_id = order.id, "Updated order");

    Ok(Json(order))
}

/// DELETE /orders/:id - 204 with an empty body
pub async fn order_destroy(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = order_id(&id)?;

    if !state.stores.orders.delete_order(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    tracing::info!(order_id = id, "Deleted order");

    Ok(StatusCode::NO_CONTENT)
}
