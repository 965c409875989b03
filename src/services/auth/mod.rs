pub mod admin;
pub mod claims_gate;
pub mod token_verifier;

pub use admin::{init_admin_services, AccessTokenSource, AdminServices};
pub use claims_gate::{AuthEvent, ClaimsGate, GateEffect, GateState};
pub use token_verifier::{FirebaseTokenVerifier, IdentityVerifier};
