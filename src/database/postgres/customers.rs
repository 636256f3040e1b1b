use async_trait::async_trait;

use super::{classify_write_error, PgStore};
use crate::database::models::{Customer, CustomerChanges, NewCustomer};
use crate::database::store::{CustomerStore, StoreError};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, created_at, updated_at";

#[async_trait]
impl CustomerStore for PgStore {
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let query = format!("SELECT {} FROM customers ORDER BY id", CUSTOMER_COLUMNS);
        let customers = sqlx::query_as::<_, Customer>(&query).fetch_all(&self.pool).await?;
        Ok(customers)
    }

    async fn find_customer(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let query = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn customer_exists(&self, id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn customer_email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, StoreError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let query = format!(
            "INSERT INTO customers (name, email, phone, address) VALUES ($1, $2, $3, $4) RETURNING {}",
            CUSTOMER_COLUMNS
        );

        sqlx::query_as::<_, Customer>(&query)
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(&customer.address)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify_write_error(e, Some("email"), None))
    }

    async fn update_customer(&self, id: i64, changes: CustomerChanges) -> Result<Option<Customer>, StoreError> {
        if changes.is_empty() {
            return self.find_customer(id).await;
        }

        let set_phone = changes.phone.is_some();
        let set_address = changes.address.is_some();
        let query = format!(
            r#"
            UPDATE customers SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = CASE WHEN $4 THEN $5 ELSE phone END,
                address = CASE WHEN $6 THEN $7 ELSE address END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        );

        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(set_phone)
            .bind(changes.phone.flatten())
            .bind(set_address)
            .bind(changes.address.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify_write_error(e, Some("email"), None))
    }

    async fn delete_customer(&self, id: i64) -> Result<bool, StoreError> {
        // orders.customer_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
