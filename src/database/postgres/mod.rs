// PostgreSQL implementation of the store traits.
//
// One `PgStore` wraps the shared pool and implements every trait; the
// per-table impls live in the sibling modules.

mod customers;
mod orders;
mod tokens;
mod users;

use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{StoreError, StoreHealth};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Translate constraint violations on a write into field-level store errors.
/// `unique_field` / `reference_field` name the column the table's
/// constraint protects.
pub(crate) fn classify_write_error(
    err: sqlx::Error,
    unique_field: Option<&'static str>,
    reference_field: Option<&'static str>,
) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let code = db_err.code();
        match (code.as_deref(), unique_field, reference_field) {
            (Some(UNIQUE_VIOLATION), Some(field), _) => return StoreError::Duplicate { field },
            (Some(FOREIGN_KEY_VIOLATION), _, Some(field)) => return StoreError::MissingReference { field },
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}
