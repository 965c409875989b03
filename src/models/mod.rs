pub mod authenticated_user;
pub mod guardia;
pub mod registration;
pub mod user_claims;
pub mod user_profile;

pub use authenticated_user::{AuthContext, AuthenticatedUser};
pub use guardia::{CreateGuardiaRequest, DocumentRef, Turno};
pub use registration::*;
pub use user_claims::UserClaims;
pub use user_profile::{Role, UserProfile};
