// handlers/public/auth/login.rs - POST /login handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::auth::{verify_dummy, verify_password};
use crate::error::ApiError;
use crate::handlers::{rules, JsonInput};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/**
 * POST /login - Verify credentials and receive a bearer token
 *
 * Unknown email and wrong password produce the same 401 response.
 *
 * Expected Input:
 * ```json
 * {
 *   "email": "string",      // Required, valid email
 *   "password": "string"    // Required
 * }
 * ```
 *
 * Expected Output:
 * ```json
 * {
 *   "message": "Login successful",
 *   "access_token": "eyJhbGciOiJIUzI1NiI...",
 *   "token_type": "Bearer"
 * }
 * ```
 */
pub async fn login_post(State(state): State<AppState>, JsonInput(input): JsonInput) -> Result<Json<Value>, ApiError> {
    let credentials = rules::credentials(&input)?;

    let user = match state.stores.users.find_user_by_email(&credentials.email).await? {
        Some(user) if verify_password(&credentials.password, &user.password_hash) => user,
        Some(user) => {
            tracing::warn!(user_id = user.id, "Failed login: wrong password");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        None => {
            // Keep timing comparable to the wrong-password path
            verify_dummy(&credentials.password);
            tracing::warn!("Failed login: unknown email");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let access_token = state.tokens.issue(&user).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(json!({
        "message": "Login successful",
        "access_token": access_token,
        "token_type": "Bearer",
    })))
}
