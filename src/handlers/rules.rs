// handlers/rules.rs - Validation rule sets per endpoint
//
// Each function validates a request body and returns the typed input, or an
// `ApiError::Validation` listing every failing field. Rules that need the
// store (uniqueness, existence) only run once the field itself is well-formed.

use serde_json::{Map, Value};

use crate::database::models::{CustomerChanges, NewCustomer, OrderFields};
use crate::database::{CustomerStore, UserStore};
use crate::error::ApiError;
use crate::validation::{Length, Presence, Validator};

pub const NAME_MAX: usize = 255;
pub const EMAIL_MAX: usize = 255;
pub const PHONE_MAX: usize = 20;
pub const ADDRESS_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 8;

/// POST /register
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /login
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn registration(input: &Map<String, Value>, users: &dyn UserStore) -> Result<Registration, ApiError> {
    let mut v = Validator::new(input);
    let name = v.string("name", Presence::Required, Length::max(NAME_MAX));
    let email = v.email("email", Presence::Required, Length::max(EMAIL_MAX));
    let password = v.secret("password", Presence::Required, Length::min(PASSWORD_MIN));

    if let Some(email) = email.as_value() {
        if users.user_email_taken(email).await? {
            v.already_taken("email");
        }
    }
    v.finish()?;

    Ok(Registration {
        name: name.required("name")?,
        email: email.required("email")?,
        password: password.required("password")?,
    })
}

pub fn credentials(input: &Map<String, Value>) -> Result<Credentials, ApiError> {
    let mut v = Validator::new(input);
    let email = v.email("email", Presence::Required, Length::default());
    let password = v.secret("password", Presence::Required, Length::default());
    v.finish()?;

    Ok(Credentials {
        email: email.required("email")?,
        password: password.required("password")?,
    })
}

pub async fn new_customer(input: &Map<String, Value>, customers: &dyn CustomerStore) -> Result<NewCustomer, ApiError> {
    let mut v = Validator::new(input);
    let name = v.string("name", Presence::Required, Length::max(NAME_MAX));
    let email = v.email("email", Presence::Required, Length::max(EMAIL_MAX));
    let phone = v.string("phone", Presence::Nullable, Length::max(PHONE_MAX));
    let address = v.string("address", Presence::Nullable, Length::max(ADDRESS_MAX));

    if let Some(email) = email.as_value() {
        if customers.customer_email_taken(email, None).await? {
            v.already_taken("email");
        }
    }
    v.finish()?;

    Ok(NewCustomer {
        name: name.required("name")?,
        email: email.required("email")?,
        phone: phone.into_option(),
        address: address.into_option(),
    })
}

/// "Sometimes" rules: only submitted fields are checked and changed
pub async fn customer_changes(
    input: &Map<String, Value>,
    customer_id: i64,
    customers: &dyn CustomerStore,
) -> Result<CustomerChanges, ApiError> {
    let mut v = Validator::new(input);
    let name = v.string("name", Presence::Sometimes, Length::max(NAME_MAX));
    let email = v.email("email", Presence::Sometimes, Length::max(EMAIL_MAX));
    let phone = v.string("phone", Presence::Nullable, Length::max(PHONE_MAX));
    let address = v.string("address", Presence::Nullable, Length::max(ADDRESS_MAX));

    if let Some(email) = email.as_value() {
        if customers.customer_email_taken(email, Some(customer_id)).await? {
            v.already_taken("email");
        }
    }
    v.finish()?;

    Ok(CustomerChanges {
        name: name.into_option(),
        email: email.into_option(),
        phone: phone.into_change(),
        address: address.into_change(),
    })
}

/// Orders are always validated in full, on create and on update
pub async fn order_fields(input: &Map<String, Value>, customers: &dyn CustomerStore) -> Result<OrderFields, ApiError> {
    let mut v = Validator::new(input);
    let customer_id = v.identifier("customer_id", Presence::Required);
    let order_date = v.date("order_date", Presence::Required);
    let status = v.string("status", Presence::Required, Length::default());
    let total = v.numeric("total", Presence::Required);

    if let Some(id) = customer_id.as_value() {
        if !customers.customer_exists(*id).await? {
            v.selection_invalid("customer_id");
        }
    }
    v.finish()?;

    Ok(OrderFields {
        customer_id: customer_id.required("customer_id")?,
        order_date: order_date.required("order_date")?,
        status: status.required("status")?,
        total: total.required("total")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn field_errors(err: ApiError) -> crate::validation::FieldErrors {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn registration_reports_all_fields() {
        let store = MemoryStore::new();
        let input = object(json!({ "name": "", "email": "nope", "password": "short" }));
        let errors = field_errors(registration(&input, &store).await.unwrap_err());

        assert_eq!(errors.len(), 3);
        assert_eq!(errors["name"], vec!["The name field is required."]);
        assert_eq!(errors["email"], vec!["The email field must be a valid email address."]);
        assert_eq!(errors["password"], vec!["The password field must be at least 8 characters."]);
    }

    #[tokio::test]
    async fn customer_requires_name_and_email_only() {
        let store = MemoryStore::new();
        let errors = field_errors(new_customer(&Map::new(), &store).await.unwrap_err());
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["email", "name"]);

        let input = object(json!({ "name": "Jane", "email": "jane@example.com" }));
        let customer = new_customer(&input, &store).await.unwrap();
        assert_eq!(customer.phone, None);
        assert_eq!(customer.address, None);
    }

    #[tokio::test]
    async fn customer_changes_follow_submitted_fields() {
        let store = MemoryStore::new();
        let input = object(json!({ "phone": "555-0100", "address": null }));
        let changes = customer_changes(&input, 1, &store).await.unwrap();

        assert_eq!(changes.name, None);
        assert_eq!(changes.email, None);
        assert_eq!(changes.phone, Some(Some("555-0100".to_string())));
        assert_eq!(changes.address, Some(None));
    }

    #[tokio::test]
    async fn order_rules_name_unknown_customer() {
        let store = MemoryStore::new();
        let input = object(json!({
            "customer_id": 999,
            "order_date": "2024-05-30",
            "status": "pending",
            "total": "100.00"
        }));
        let errors = field_errors(order_fields(&input, &store).await.unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["customer_id"], vec!["The selected customer id is invalid."]);
    }

    #[tokio::test]
    async fn login_needs_both_fields() {
        let errors = field_errors(credentials(&object(json!({ "email": "a@b.com" }))).unwrap_err());
        assert_eq!(errors["password"], vec!["The password field is required."]);
        assert!(!errors.contains_key("email"));
    }
}
