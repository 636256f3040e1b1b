use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{AccessToken, NewAccessToken, User};
use crate::database::{StoreError, TokenStore};

/// Name recorded on every token minted by `/login`
pub const LOGIN_TOKEN_NAME: &str = "auth_token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Key of the `access_tokens` row backing this token
    pub jti: Uuid,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Token has been revoked")]
    Revoked,

    #[error("Token has expired")]
    Expired,

    #[error("Token subject does not match its session")]
    SubjectMismatch,

    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues, validates and revokes bearer tokens.
///
/// Tokens are HS256 JWTs whose `jti` names a stored session row, so a token
/// stays usable only while that row exists.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Option<Duration>,
}

impl TokenService {
    pub fn new(store: Arc<dyn TokenStore>, secret: &str, expiry_hours: Option<u64>) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            store,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: expiry_hours.map(|hours| Duration::hours(hours as i64)),
        })
    }

    /// Mint a new session for `user`; other sessions are left alone
    pub async fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = self.expiry.map(|ttl| now + ttl);

        let session = self
            .store
            .insert_token(NewAccessToken {
                id: Uuid::new_v4(),
                user_id: user.id,
                name: LOGIN_TOKEN_NAME.to_string(),
                expires_at,
            })
            .await?;

        let claims = Claims {
            sub: user.id.to_string(),
            jti: session.id,
            iat: now.timestamp(),
            exp: expires_at.map(|at| at.timestamp()),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Resolve a presented bearer token to its live session
    pub async fn authenticate(&self, token: &str) -> Result<AccessToken, TokenError> {
        let mut validation = Validation::default();
        // `exp` is only present when expiry is configured
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        let session = self.store.find_token(claims.jti).await?.ok_or(TokenError::Revoked)?;

        if session.user_id.to_string() != claims.sub {
            return Err(TokenError::SubjectMismatch);
        }
        if session.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(session)
    }

    /// Revoke every session the user holds
    pub async fn revoke_all(&self, user_id: i64) -> Result<u64, TokenError> {
        Ok(self.store.revoke_user_tokens(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::{MemoryStore, UserStore};

    async fn setup(expiry_hours: Option<u64>) -> (TokenService, User) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let service = TokenService::new(store, "test-secret", expiry_hours).unwrap();
        (service, user)
    }

    #[tokio::test]
    async fn issued_token_authenticates_until_revoked() {
        let (service, user) = setup(None).await;
        let token = service.issue(&user).await.unwrap();

        let session = service.authenticate(&token).await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.name, LOGIN_TOKEN_NAME);
        assert_eq!(session.expires_at, None);

        assert_eq!(service.revoke_all(user.id).await.unwrap(), 1);
        assert!(matches!(service.authenticate(&token).await, Err(TokenError::Revoked)));
    }

    #[tokio::test]
    async fn logout_revokes_every_session() {
        let (service, user) = setup(None).await;
        let first = service.issue(&user).await.unwrap();
        let second = service.issue(&user).await.unwrap();
        assert_ne!(first, second);

        assert_eq!(service.revoke_all(user.id).await.unwrap(), 2);
        assert!(service.authenticate(&first).await.is_err());
        assert!(service.authenticate(&second).await.is_err());
    }

    #[tokio::test]
    async fn configured_expiry_is_stamped_on_token() {
        let (service, user) = setup(Some(2)).await;
        let token = service.issue(&user).await.unwrap();
        let session = service.authenticate(&token).await.unwrap();
        assert!(session.expires_at.is_some());
    }

    #[tokio::test]
    async fn rejects_garbage_and_foreign_signatures() {
        let (service, user) = setup(None).await;
        assert!(matches!(service.authenticate("not-a-jwt").await, Err(TokenError::Invalid(_))));

        let other_store = Arc::new(MemoryStore::new());
        let other = TokenService::new(other_store, "another-secret", None).unwrap();
        let claims = Claims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4(),
            iat: Utc::now().timestamp(),
            exp: None,
        };
        let forged = encode(&Header::default(), &claims, &other.encoding_key).unwrap();
        assert!(matches!(service.authenticate(&forged).await, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(TokenService::new(store, "", None), Err(TokenError::MissingSecret)));
    }
}
