use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::LOCATION,
    Error, HttpMessage, HttpResponse, ResponseError,
};
use futures_util::future::{ok, ready, Ready};
use log::debug;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::error::AppError;
use crate::models::AuthContext;
use crate::services::auth::claims_gate::{AuthEvent, ClaimsGate, GateEffect, DEFAULT_SAFE_ROUTE};

/// Runs the request's [`AuthContext`] through the claims gate.
///
/// Must be wrapped inside [`super::SessionAuthentication`] so a context is
/// present. A user without the global-admin claim is redirected with a
/// notification; the wrapped handler only runs once the gate authorizes.
#[derive(Clone)]
pub struct GlobalAdminRequired {
    redirect_to: Rc<str>,
}

impl Default for GlobalAdminRequired {
    fn default() -> Self {
        Self::redirecting_to(DEFAULT_SAFE_ROUTE)
    }
}

impl GlobalAdminRequired {
    pub fn redirecting_to(path: &str) -> Self {
        Self { redirect_to: Rc::from(path) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GlobalAdminRequired
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = GlobalAdminRequiredMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(GlobalAdminRequiredMiddleware {
            service: Rc::new(service),
            redirect_to: self.redirect_to.clone(),
        })
    }
}

pub struct GlobalAdminRequiredMiddleware<S> {
    service: Rc<S>,
    redirect_to: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for GlobalAdminRequiredMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == actix_web::http::Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) });
        }

        let ctx = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_else(AuthContext::anonymous);

        let mut gate = ClaimsGate::new(&self.redirect_to);
        let effects = gate.handle(AuthEvent::from_context(&ctx));

        if gate.can_render() {
            debug!("Global admin gate passed for {}", req.path());
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) });
        }

        let mut redirect = None;
        let mut notification = None;
        for effect in effects {
            match effect {
                GateEffect::Redirect(path) => redirect = Some(path),
                GateEffect::Notify(message) => notification = Some(message),
            }
        }

        match redirect {
            Some(location) => {
                let response = HttpResponse::SeeOther()
                    .insert_header((LOCATION, location.clone()))
                    .json(json!({
                        "notification": notification,
                        "redirect": location,
                    }));
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
            // No user: the outer authentication flow owns this response
            None => {
                let response = AppError::Unauthorized("Authentication required".to_string()).error_response();
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}
