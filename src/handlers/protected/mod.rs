// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Security Level: Bearer token, verified by `bearer_auth_middleware`
// Routes: /profile, /logout, /customers/*, /orders/* (also under /api)
//
// The auth gate runs before every handler here and inserts an `AuthUser`
// extension; handlers that need the caller take `Extension<AuthUser>`.

pub mod auth; // Session endpoints for the authenticated user
pub mod customers; // Customer read/update/delete and customer-with-orders
pub mod orders; // Order CRUD

pub use auth::*;
