// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Routes: /register, /login, POST /customers (also under /api)

pub mod auth; // Account creation and token acquisition
pub mod customers; // Anonymous customer sign-up

pub use auth::*;
pub use customers::customer_create;
