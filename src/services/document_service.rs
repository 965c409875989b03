use log::info;
use std::sync::Arc;

use crate::clients::DocumentStore;
use crate::error::AppError;
use crate::models::DocumentRef;
use crate::services::auth::admin::AccessTokenSource;

/// Deletes common-area and guard records with admin credentials.
///
/// The delete endpoints are the confirm step of a confirm-then-call flow:
/// each request results in exactly one backend call.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    tokens: Option<Arc<dyn AccessTokenSource>>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: Option<Arc<dyn AccessTokenSource>>) -> Self {
        Self { store, tokens }
    }

    pub async fn delete(&self, doc: &DocumentRef) -> Result<(), AppError> {
        doc.validate()?;

        let tokens = self.tokens.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Admin services are not configured".to_string())
        })?;

        let access_token = tokens.access_token().await?;
        let path = doc.path();
        self.store.delete_document(&path, &access_token).await?;

        info!("Deleted {} document {}", doc.kind(), path);
        Ok(())
    }
}
