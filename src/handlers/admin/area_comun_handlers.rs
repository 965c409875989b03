use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::models::DocumentRef;
use crate::services::DocumentService;

/// DELETE /api/admin/residenciales/{residencialId}/areas-comunes/{id}
pub async fn delete_area_comun(
    path: web::Path<(String, String)>,
    documents: web::Data<DocumentService>,
) -> Result<HttpResponse, AppError> {
    let (residencial_id, id) = path.into_inner();
    let doc = DocumentRef::area_comun(residencial_id, id)?;
    documents.delete(&doc).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
