use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    AccessToken, Customer, CustomerChanges, NewAccessToken, NewCustomer, NewUser, Order, OrderFields, User,
};

/// Errors surfaced by every store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate value for {field}")]
    Duplicate { field: &'static str },

    /// A foreign key pointed at a row that does not exist
    #[error("Referenced row missing for {field}")]
    MissingReference { field: &'static str },

    #[error("Store configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Identity store
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn user_email_taken(&self, email: &str) -> Result<bool, StoreError>;
}

/// Persisted side of the token service
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert_token(&self, token: NewAccessToken) -> Result<AccessToken, StoreError>;

    async fn find_token(&self, id: Uuid) -> Result<Option<AccessToken>, StoreError>;

    /// Removes every token belonging to `user_id`, returning how many were revoked
    async fn revoke_user_tokens(&self, user_id: i64) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;

    async fn find_customer(&self, id: i64) -> Result<Option<Customer>, StoreError>;

    async fn customer_exists(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.find_customer(id).await?.is_some())
    }

    /// Uniqueness probe; `except` skips the row being updated
    async fn customer_email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, StoreError>;

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError>;

    /// `Ok(None)` when no customer has that id
    async fn update_customer(&self, id: i64, changes: CustomerChanges) -> Result<Option<Customer>, StoreError>;

    /// Deletes the customer and, through the cascade, all of its orders.
    /// Returns `false` when nothing matched.
    async fn delete_customer(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// All orders where `customer_id` matches, oldest first
    async fn list_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, StoreError>;

    async fn find_order(&self, id: i64) -> Result<Option<Order>, StoreError>;

    async fn insert_order(&self, order: OrderFields) -> Result<Order, StoreError>;

    async fn update_order(&self, id: i64, order: OrderFields) -> Result<Option<Order>, StoreError>;

    async fn delete_order(&self, id: i64) -> Result<bool, StoreError>;
}

/// Liveness probe used by `/health`
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Handles to every store, shared by the router state
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub orders: Arc<dyn OrderStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Wire a single backend that implements every store trait
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: UserStore + TokenStore + CustomerStore + OrderStore + StoreHealth + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            users: backend.clone(),
            tokens: backend.clone(),
            customers: backend.clone(),
            orders: backend.clone(),
            health: backend,
        }
    }
}
