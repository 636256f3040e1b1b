use async_trait::async_trait;
use uuid::Uuid;

use super::{classify_write_error, PgStore};
use crate::database::models::{AccessToken, NewAccessToken};
use crate::database::store::{StoreError, TokenStore};

#[async_trait]
impl TokenStore for PgStore {
    async fn insert_token(&self, token: NewAccessToken) -> Result<AccessToken, StoreError> {
        sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (id, user_id, name, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, created_at, expires_at
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.name)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, None, Some("user_id")))
    }

    async fn find_token(&self, id: Uuid) -> Result<Option<AccessToken>, StoreError> {
        let token = sqlx::query_as::<_, AccessToken>(
            "SELECT id, user_id, name, created_at, expires_at FROM access_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn revoke_user_tokens(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
