// handlers/public/auth/register.rs - POST /register handler

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::auth::hash_password;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::handlers::{rules, JsonInput};
use crate::services::dispatch_welcome;
use crate::state::AppState;

/**
 * POST /register - Create a user account
 *
 * No token is issued; clients log in afterwards. A welcome notification is
 * dispatched in the background and never affects the response.
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "string",       // Required, at most 255 characters
 *   "email": "string",      // Required, valid, unique among users
 *   "password": "string"    // Required, at least 8 characters
 * }
 * ```
 *
 * Expected Output (201):
 * ```json
 * {
 *   "message": "User registered successfully",
 *   "status": true,
 *   "user": { "id": 1, "name": "Ada", "email": "ada@example.com", ... }
 * }
 * ```
 */
pub async fn register_post(
    State(state): State<AppState>,
    JsonInput(input): JsonInput,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registration = rules::registration(&input, state.stores.users.as_ref()).await?;

    let password_hash = hash_password(&registration.password)?;
    let user = state
        .stores
        .users
        .insert_user(NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, "Registered user");
    dispatch_welcome(state.notifier.clone(), user.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "status": true,
            "user": user,
        })),
    ))
}
