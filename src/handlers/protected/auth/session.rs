// handlers/protected/auth/session.rs - GET /profile and GET /logout handlers

use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /profile - Current authenticated user
///
/// Expected Output:
/// ```json
/// {
///   "status": true,
///   "message": "User profile information",
///   "data": {
///     "id": 1,
///     "name": "Ada",
///     "email": "ada@example.com",
///     "created_at": "2024-05-30T12:00:00Z",
///     "updated_at": "2024-05-30T12:00:00Z"
///   }
/// }
/// ```
pub async fn profile(Extension(auth): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "status": true,
        "message": "User profile information",
        "data": auth.user,
    }))
}

/// GET /logout - Revoke every token the user holds
///
/// Other devices are signed out too; the presented token stops working
/// immediately.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let revoked = state.tokens.revoke_all(auth.user.id).await?;
    tracing::info!(user_id = auth.user.id, revoked, "User logged out");

    Ok(Json(json!({
        "status": true,
        "message": "Logout successful",
    })))
}
