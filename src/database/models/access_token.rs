use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Server-side record of an issued bearer token; `id` is the JWT `jti`.
/// Deleting the row revokes the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AccessToken {
    pub id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAccessToken {
    pub id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
}
