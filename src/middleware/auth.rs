use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity resolved by the auth gate, handed to protected handlers
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
    /// Session the request was made with
    pub token_id: Uuid,
}

/// Bearer-token gate for protected routes.
///
/// Rejects with 401 before the handler runs when the header is missing or
/// malformed, or the token is badly signed, expired or revoked.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|reason| {
        tracing::debug!("Rejected request: {}", reason);
        ApiError::unauthenticated()
    })?;

    let session = state.tokens.authenticate(token).await.map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    // Tokens cascade with their user, but a concurrent delete can still race us
    let user = state
        .stores
        .users
        .find_user(session.user_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Token {} references missing user {}", session.id, session.user_id);
            ApiError::unauthenticated()
        })?;

    request.extensions_mut().insert(AuthUser {
        user,
        token_id: session.id,
    });

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}
