// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (bearer token, resolved by the auth gate)
pub mod protected; // Bearer token required: /profile, /logout, /customers/*, /orders/*
pub mod public; // No authentication: /register, /login, POST /customers
pub mod rules; // Validation rule sets shared by both tiers

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// JSON object request body.
///
/// An empty body reads as `{}` so missing fields surface as validation
/// errors rather than a body rejection.
#[derive(Debug, Default)]
pub struct JsonInput(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonInput
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonInput(Map::new()));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(JsonInput(map)),
            _ => Err(ApiError::bad_request("Malformed JSON body").into_response()),
        }
    }
}

/// Parse a `{id}` path segment; anything that is not a positive integer
/// cannot name a row
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
