// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::{PasswordError, TokenError};
use crate::database::StoreError;
use crate::validation::{invalid_selection_message, single_error, taken_message, FieldErrors};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    /// Rendered as a bare `{field: [messages]}` map
    Validation(FieldErrors),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Validation(_) => "The given data was invalid.",
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation(field_errors) => json!(field_errors),
            _ => json!({ "message": self.message() }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Unauthenticated.".to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Constraint violations that slipped past the validator's lookups
            StoreError::Duplicate { field } => ApiError::Validation(single_error(field, taken_message(field))),
            StoreError::MissingReference { field } => {
                ApiError::Validation(single_error(field, invalid_selection_message(field)))
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            StoreError::Migration(migrate_err) => {
                tracing::error!("Migration error: {}", migrate_err);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            StoreError::Config(msg) => {
                tracing::error!("Store configuration error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Store(store_err) => store_err.into(),
            TokenError::Invalid(_) | TokenError::Revoked | TokenError::Expired | TokenError::SubjectMismatch => {
                ApiError::unauthenticated()
            }
            TokenError::MissingSecret => {
                tracing::error!("Token signing secret is not configured");
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_as_bare_field_map() {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_string(), vec!["The email field is required.".to_string()]);
        let err = ApiError::from(errors);

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json(), json!({ "email": ["The email field is required."] }));
    }

    #[test]
    fn duplicate_store_error_becomes_field_error() {
        let err = ApiError::from(StoreError::Duplicate { field: "email" });
        assert_eq!(err.to_json(), json!({ "email": ["The email has already been taken."] }));
    }

    #[test]
    fn missing_reference_names_the_field() {
        let err = ApiError::from(StoreError::MissingReference { field: "customer_id" });
        assert_eq!(err.to_json(), json!({ "customer_id": ["The selected customer id is invalid."] }));
    }

    #[test]
    fn message_errors_use_message_envelope() {
        let err = ApiError::not_found("Customer not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json(), json!({ "message": "Customer not found" }));
        assert_eq!(ApiError::unauthenticated().to_json(), json!({ "message": "Unauthenticated." }));
    }
}
