pub mod access_token;
pub mod customer;
pub mod order;
pub mod user;

pub use access_token::{AccessToken, NewAccessToken};
pub use customer::{Customer, CustomerChanges, NewCustomer};
pub use order::{Order, OrderFields};
pub use user::{NewUser, User};
