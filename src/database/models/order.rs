use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub order_date: NaiveDate,
    pub status: String,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full set of writable order columns, used for both create and update
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFields {
    pub customer_id: i64,
    pub order_date: NaiveDate,
    pub status: String,
    pub total: BigDecimal,
}
