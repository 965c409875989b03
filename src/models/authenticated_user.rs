use actix_web::{dev::Payload, Error, FromRequest, HttpRequest, HttpMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use super::user_claims::UserClaims;
use super::user_profile::{Role, UserProfile};

/// Identity resolved from a verified session cookie.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// The provider ID token the session was resolved from. Forwarded to
    /// callable functions so they see the caller's identity.
    #[serde(skip)]
    pub id_token: String,
}

/// Per-request authentication state.
///
/// Inserted into request extensions by the session middleware and passed
/// explicitly to whatever needs it; there is no process-wide auth state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthContext {
    pub user: Option<AuthenticatedUser>,
    pub claims: UserClaims,
    pub loading: bool,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: AuthenticatedUser, claims: UserClaims) -> Self {
        Self {
            user: Some(user),
            claims,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Profile view of the signed-in user, if any.
    pub fn profile(&self) -> Option<UserProfile> {
        let user = self.user.as_ref()?;
        let created_at = user.created_at.unwrap_or_else(Utc::now);
        Some(UserProfile {
            id: user.uid.clone(),
            name: user.display_name.clone().unwrap_or_default(),
            paternal_last_name: String::new(),
            maternal_last_name: String::new(),
            email: user.email.clone(),
            phone: user.phone_number.clone().unwrap_or_default(),
            role: self.claims.role.unwrap_or(Role::User),
            residencial_id: self.claims.residencial_id.clone(),
            house_id: None,
            created_at,
            updated_at: user.last_login_at.unwrap_or(created_at),
        })
    }
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let ctx = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_else(AuthContext::anonymous);
        ready(Ok(ctx))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().and_then(|ctx| ctx.user.clone()) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(actix_web::error::ErrorUnauthorized("Not authenticated"))),
        }
    }
}
