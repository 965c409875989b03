pub mod global_admin;
pub mod session_auth;

pub use global_admin::GlobalAdminRequired;
pub use session_auth::SessionAuthentication;
