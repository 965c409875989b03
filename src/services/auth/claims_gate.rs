//! Global-admin claims gate.
//!
//! An explicit finite-state machine driven by discrete auth-state events.
//! Nothing here touches HTTP; the middleware in `middleware::global_admin`
//! feeds request contexts through it and acts on the returned effects.

use log::warn;

use crate::models::{AuthContext, AuthenticatedUser, UserClaims};

pub const DEFAULT_SAFE_ROUTE: &str = "/dashboard";
pub const GLOBAL_ADMIN_REQUIRED_MESSAGE: &str =
    "Acceso denegado: se requieren permisos de administrador global";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateState {
    /// The identity provider is still resolving the current user.
    Loading,
    /// No user, or a user without the required claim.
    Unauthorized { uid: Option<String> },
    Authorized { uid: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    Resolving,
    Resolved {
        user: Option<AuthenticatedUser>,
        claims: UserClaims,
    },
    SignedOut,
}

impl AuthEvent {
    /// Event describing a resolved request context.
    pub fn from_context(ctx: &AuthContext) -> Self {
        if ctx.loading {
            AuthEvent::Resolving
        } else {
            AuthEvent::Resolved {
                user: ctx.user.clone(),
                claims: ctx.claims.clone(),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateEffect {
    Redirect(String),
    Notify(String),
}

#[derive(Clone, Debug)]
pub struct ClaimsGate {
    state: GateState,
    redirect_to: String,
}

impl Default for ClaimsGate {
    fn default() -> Self {
        Self::new(DEFAULT_SAFE_ROUTE)
    }
}

impl ClaimsGate {
    pub fn new(redirect_to: &str) -> Self {
        Self {
            state: GateState::Loading,
            redirect_to: redirect_to.to_string(),
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Protected content may only be produced in `Authorized`.
    pub fn can_render(&self) -> bool {
        matches!(self.state, GateState::Authorized { .. })
    }

    /// Applies `event`, returning the side effects the caller must perform.
    pub fn handle(&mut self, event: AuthEvent) -> Vec<GateEffect> {
        let (next, effects) = transition(&self.state, event, &self.redirect_to);
        self.state = next;
        effects
    }
}

/// Pure transition function of the gate.
///
/// A signed-in user lacking the global-admin flag produces exactly one
/// notification and one redirect when entering `Unauthorized`; repeating the
/// same resolution while already there produces nothing. A missing user
/// never produces effects: the outer authentication flow owns that redirect.
pub fn transition(state: &GateState, event: AuthEvent, redirect_to: &str) -> (GateState, Vec<GateEffect>) {
    match event {
        AuthEvent::Resolving => (GateState::Loading, Vec::new()),
        AuthEvent::SignedOut | AuthEvent::Resolved { user: None, .. } => {
            (GateState::Unauthorized { uid: None }, Vec::new())
        }
        AuthEvent::Resolved { user: Some(user), claims } => {
            if claims.is_global_admin {
                return (GateState::Authorized { uid: user.uid }, Vec::new());
            }

            let already_rejected = matches!(
                state,
                GateState::Unauthorized { uid: Some(uid) } if *uid == user.uid
            );
            if already_rejected {
                return (state.clone(), Vec::new());
            }

            warn!("User {} lacks global admin claim; redirecting to {}", user.uid, redirect_to);
            (
                GateState::Unauthorized { uid: Some(user.uid) },
                vec![
                    GateEffect::Notify(GLOBAL_ADMIN_REQUIRED_MESSAGE.to_string()),
                    GateEffect::Redirect(redirect_to.to_string()),
                ],
            )
        }
    }
}
