// In-process store backend.
//
// Keeps every table behind one lock so uniqueness checks and inserts are
// atomic, and mirrors the PostgreSQL constraints: unique emails, order ->
// customer foreign key with cascading delete, token -> user foreign key.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    AccessToken, Customer, CustomerChanges, NewAccessToken, NewCustomer, NewUser, Order, OrderFields, User,
};
use super::store::{CustomerStore, OrderStore, StoreError, StoreHealth, TokenStore, UserStore};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tokens: HashMap<Uuid, AccessToken>,
    customers: BTreeMap<i64, Customer>,
    orders: BTreeMap<i64, Order>,
    user_seq: i64,
    customer_seq: i64,
    order_seq: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }

        let now = Utc::now();
        let user = User {
            id: next_id(&mut tables.user_seq),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_email_taken(&self, email: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token(&self, token: NewAccessToken) -> Result<AccessToken, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&token.user_id) {
            return Err(StoreError::MissingReference { field: "user_id" });
        }

        let token = AccessToken {
            id: token.id,
            user_id: token.user_id,
            name: token.name,
            created_at: Utc::now(),
            expires_at: token.expires_at,
        };
        tables.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_token(&self, id: Uuid) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.tables.read().await.tokens.get(&id).cloned())
    }

    async fn revoke_user_tokens(&self, user_id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.tokens.len();
        tables.tokens.retain(|_, token| token.user_id != user_id);
        Ok((before - tables.tokens.len()) as u64)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.tables.read().await.customers.values().cloned().collect())
    }

    async fn find_customer(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn customer_email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .any(|c| c.email == email && Some(c.id) != except))
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.customers.values().any(|c| c.email == customer.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }

        let now = Utc::now();
        let customer = Customer {
            id: next_id(&mut tables.customer_seq),
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            created_at: now,
            updated_at: now,
        };
        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(&self, id: i64, changes: CustomerChanges) -> Result<Option<Customer>, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.customers.values().any(|c| &c.email == email && c.id != id) {
                return Err(StoreError::Duplicate { field: "email" });
            }
        }

        let Some(customer) = tables.customers.get_mut(&id) else {
            return Ok(None);
        };
        if !changes.is_empty() {
            changes.apply(customer);
            customer.updated_at = Utc::now();
        }
        Ok(Some(customer.clone()))
    }

    async fn delete_customer(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.customers.remove(&id).is_none() {
            return Ok(false);
        }
        tables.orders.retain(|_, order| order.customer_id != id);
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.tables.read().await.orders.values().cloned().collect())
    }

    async fn list_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn find_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn insert_order(&self, order: OrderFields) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(StoreError::MissingReference { field: "customer_id" });
        }

        let now = Utc::now();
        let order = Order {
            id: next_id(&mut tables.order_seq),
            customer_id: order.customer_id,
            order_date: order.order_date,
            status: order.status,
            total: order.total,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, id: i64, fields: OrderFields) -> Result<Option<Order>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&id) {
            return Ok(None);
        }
        if !tables.customers.contains_key(&fields.customer_id) {
            return Err(StoreError::MissingReference { field: "customer_id" });
        }

        let Some(order) = tables.orders.get_mut(&id) else {
            return Ok(None);
        };
        order.customer_id = fields.customer_id;
        order.order_date = fields.order_date;
        order.status = fields.status;
        order.total = fields.total;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn delete_order(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.orders.remove(&id).is_some())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            phone: None,
            address: None,
        }
    }

    fn order_for(customer_id: i64) -> OrderFields {
        OrderFields {
            customer_id,
            order_date: NaiveDate::from_ymd_opt(2024, 5, 30).unwrap(),
            status: "pending".to_string(),
            total: BigDecimal::from_str("100.50").unwrap(),
        }
    }

    #[tokio::test]
    async fn customer_emails_are_unique() {
        let store = MemoryStore::new();
        store.insert_customer(new_customer("a@b.com")).await.unwrap();
        let err = store.insert_customer(new_customer("a@b.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "email" }));
    }

    #[tokio::test]
    async fn email_probe_ignores_own_row() {
        let store = MemoryStore::new();
        let customer = store.insert_customer(new_customer("a@b.com")).await.unwrap();
        assert!(store.customer_email_taken("a@b.com", None).await.unwrap());
        assert!(!store.customer_email_taken("a@b.com", Some(customer.id)).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_customer_cascades_to_orders() {
        let store = MemoryStore::new();
        let keep = store.insert_customer(new_customer("keep@b.com")).await.unwrap();
        let gone = store.insert_customer(new_customer("gone@b.com")).await.unwrap();
        store.insert_order(order_for(keep.id)).await.unwrap();
        store.insert_order(order_for(gone.id)).await.unwrap();

        assert!(store.delete_customer(gone.id).await.unwrap());
        assert!(!store.delete_customer(gone.id).await.unwrap());

        let remaining = store.list_orders().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].customer_id, keep.id);
    }

    #[tokio::test]
    async fn orders_require_existing_customer() {
        let store = MemoryStore::new();
        let err = store.insert_order(order_for(42)).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { field: "customer_id" }));
    }

    #[tokio::test]
    async fn update_missing_order_is_none() {
        let store = MemoryStore::new();
        let customer = store.insert_customer(new_customer("a@b.com")).await.unwrap();
        assert!(store.update_order(7, order_for(customer.id)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoking_removes_only_that_users_tokens() {
        let store = MemoryStore::new();
        let alice = store
            .insert_user(NewUser {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let bob = store
            .insert_user(NewUser {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        for user_id in [alice.id, alice.id, bob.id] {
            store
                .insert_token(NewAccessToken {
                    id: Uuid::new_v4(),
                    user_id,
                    name: "auth_token".to_string(),
                    expires_at: None,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.revoke_user_tokens(alice.id).await.unwrap(), 2);
        assert_eq!(store.revoke_user_tokens(alice.id).await.unwrap(), 0);
        assert_eq!(store.revoke_user_tokens(bob.id).await.unwrap(), 1);
    }
}
