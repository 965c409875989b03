use actix_web::{error::InternalError, web, HttpResponse, ResponseError};
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers;
use crate::middleware::{GlobalAdminRequired, SessionAuthentication};
use crate::services::auth::IdentityVerifier;

/// JSON extractor config shared by every route: malformed or unexpected
/// bodies become a 400 in the usual error format.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let app_error = AppError::BadRequest(format!("Invalid request body: {}", err));
        let response = app_error.error_response();
        InternalError::from_response(err, response).into()
    })
}

/// Configures everything under the "/api" scope.
///
/// Session endpoints and registration are public. `/auth/me` needs a
/// session; `/admin` needs a session carrying the global-admin claim.
pub fn configure_api_routes(cfg: &mut web::ServiceConfig, verifier: Arc<dyn IdentityVerifier>) {
    cfg.service(
        web::resource("/auth/me")
            .wrap(SessionAuthentication::new(verifier.clone()))
            .route(web::get().to(handlers::auth::session_status)),
    );
    cfg.service(
        web::resource("/auth/session")
            .route(web::post().to(handlers::auth::create_session))
            .route(web::delete().to(handlers::auth::delete_session)),
    );
    cfg.route("/auth/clear-session", web::post().to(handlers::auth::clear_session));
    cfg.route("/register", web::post().to(handlers::register_handlers::register));

    // Last wrap runs first: the session is resolved before the gate sees it
    cfg.service(
        web::scope("/admin")
            .wrap(GlobalAdminRequired::default())
            .wrap(SessionAuthentication::new(verifier))
            .route("/guardias", web::post().to(handlers::admin::create_guardia))
            .route(
                "/residenciales/{residencialId}/guardias/{id}",
                web::delete().to(handlers::admin::delete_guardia),
            )
            .route(
                "/residenciales/{residencialId}/areas-comunes/{id}",
                web::delete().to(handlers::admin::delete_area_comun),
            )
            .route("/users/{uid}/claims", web::post().to(handlers::admin::set_user_claims)),
    );
}

/// Unmatched routes answer with the JSON error body.
pub async fn not_found() -> HttpResponse {
    AppError::NotFound("Route not found".to_string()).error_response()
}
