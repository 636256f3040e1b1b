pub mod password;
pub mod token;

pub use password::{hash_password, verify_dummy, verify_password, PasswordError};
pub use token::{Claims, TokenError, TokenService, LOGIN_TOKEN_NAME};
