use async_trait::async_trait;

use super::{classify_write_error, PgStore};
use crate::database::models::{Order, OrderFields};
use crate::database::store::{OrderStore, StoreError};

const ORDER_COLUMNS: &str = "id, customer_id, order_date, status, total, created_at, updated_at";

#[async_trait]
impl OrderStore for PgStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let query = format!("SELECT {} FROM orders ORDER BY id", ORDER_COLUMNS);
        let orders = sqlx::query_as::<_, Order>(&query).fetch_all(&self.pool).await?;
        Ok(orders)
    }

    async fn list_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, StoreError> {
        let query = format!("SELECT {} FROM orders WHERE customer_id = $1 ORDER BY id", ORDER_COLUMNS);
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn find_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let query = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn insert_order(&self, order: OrderFields) -> Result<Order, StoreError> {
        let query = format!(
            "INSERT INTO orders (customer_id, order_date, status, total) VALUES ($1, $2, $3, $4) RETURNING {}",
            ORDER_COLUMNS
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(order.customer_id)
            .bind(order.order_date)
            .bind(&order.status)
            .bind(order.total)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify_write_error(e, None, Some("customer_id")))
    }

    async fn update_order(&self, id: i64, order: OrderFields) -> Result<Option<Order>, StoreError> {
        let query = format!(
            r#"
            UPDATE orders SET
                customer_id = $2,
                order_date = $3,
                status = $4,
                total = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(order.customer_id)
            .bind(order.order_date)
            .bind(&order.status)
            .bind(order.total)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify_write_error(e, None, Some("customer_id")))
    }

    async fn delete_order(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
