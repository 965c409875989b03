use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, ready, Ready};
use log::warn;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::error::AppError;
use crate::services::auth::IdentityVerifier;
use crate::services::session_cookie::SessionCookieManager;

/// Resolves the `session` cookie into an [`AuthContext`] stored in request
/// extensions. A missing or rejected session ends the request with 401.
#[derive(Clone)]
pub struct SessionAuthentication {
    verifier: Arc<dyn IdentityVerifier>,
}

impl SessionAuthentication {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionAuthenticationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionAuthenticationMiddleware {
            service: Arc::new(service),
            verifier: self.verifier.clone(),
        })
    }
}

pub struct SessionAuthenticationMiddleware<S> {
    service: Arc<S>,
    verifier: Arc<dyn IdentityVerifier>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthenticationMiddleware<S>
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
        let service = self.service.clone();
        let path = req.path().to_string();

        // CORS pre-flight carries no cookies
        if req.method() == actix_web::http::Method::OPTIONS {
            return Box::pin(async move { service.call(req).await.map(|res| res.map_into_left_body()) });
        }

        let token = match SessionCookieManager::token_from_request(req.request()) {
            Some(token) => token,
            None => {
                warn!("No session cookie for protected path: {}", path);
                let response = AppError::Unauthorized("Missing session".to_string()).error_response();
                return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
            }
        };

        let verifier = self.verifier.clone();

        Box::pin(async move {
            let ctx = match verifier.verify(&token).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    warn!("Session rejected for path {}: {}", path, e);
                    return Ok(req.into_response(e.error_response()).map_into_right_body());
                }
            };

            if let Some(user) = &ctx.user {
                tracing::debug!(
                    uid = %user.uid,
                    global_admin = ctx.claims.is_global_admin,
                    path = %path,
                    "session_resolved"
                );
            }

            req.extensions_mut().insert(ctx);
            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}
