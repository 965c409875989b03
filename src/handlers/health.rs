use actix_web::{web, HttpResponse, Responder};
use serde::{Serialize, Deserialize};
use std::sync::Arc;

use crate::services::auth::AdminServices;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    version: String,
    admin_services: bool,
}

pub async fn health_check(admin: web::Data<Option<Arc<AdminServices>>>) -> impl Responder {
    // Public health endpoint - only return basic status, no credentials
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        admin_services: admin.is_some(),
    };

    HttpResponse::Ok().json(response)
}
