//! Handlers behind the global-admin gate. Every route here is mounted inside
//! `SessionAuthentication` and `GlobalAdminRequired`.

pub mod area_comun_handlers;
pub mod claims_handlers;
pub mod guardia_handlers;

pub use area_comun_handlers::delete_area_comun;
pub use claims_handlers::set_user_claims;
pub use guardia_handlers::{create_guardia, delete_guardia};
