use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::models::{RegistrationRequest, RegistrationResponse};
use crate::services::registration_service;

/// POST /api/register
///
/// Validates the applicant's answers and returns the normalized record the
/// account-creation step consumes. Nothing is stored here.
pub async fn register(body: web::Json<RegistrationRequest>) -> AppResult<HttpResponse> {
    let user_data = registration_service::intake(&body)?;

    Ok(HttpResponse::Ok().json(RegistrationResponse {
        success: true,
        user_data,
    }))
}
