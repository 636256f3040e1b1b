pub mod session;

pub use session::logout as session_logout;
pub use session::profile as session_profile;
