use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::models::{AuthenticatedUser, CreateGuardiaRequest, DocumentRef};
use crate::services::{DocumentService, GuardiaService};

/// POST /api/admin/guardias
///
/// Provisions a guard account through the `createSecurityUser` function,
/// called with the admin's own ID token. The function result is returned
/// as-is.
pub async fn create_guardia(
    user: AuthenticatedUser,
    guardias: web::Data<GuardiaService>,
    body: web::Json<CreateGuardiaRequest>,
) -> Result<HttpResponse, AppError> {
    let result = guardias.create_guardia(&body, Some(&user.id_token)).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /api/admin/residenciales/{residencialId}/guardias/{id}
pub async fn delete_guardia(
    path: web::Path<(String, String)>,
    documents: web::Data<DocumentService>,
) -> Result<HttpResponse, AppError> {
    let (residencial_id, id) = path.into_inner();
    let doc = DocumentRef::guardia(residencial_id, id)?;
    documents.delete(&doc).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
