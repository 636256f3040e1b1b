// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints. Neither one requires a bearer token; login is
// the only way to obtain one.

pub mod login; // POST /login - verify credentials and mint a bearer token
pub mod register; // POST /register - create a user account

pub use login::login_post;
pub use register::register_post;
