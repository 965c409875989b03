use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};

use crate::config::settings::AppSettings;

#[derive(Debug, thiserror::Error)]
pub enum FirestoreClientError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("document store returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Deletes the document at `path` (relative to the database root).
    /// Fails with `NotFound` when nothing exists there.
    async fn delete_document(&self, path: &str, access_token: &str) -> Result<(), FirestoreClientError>;
}

/// REST client for the project's default document database.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: Client,
    documents_url: String,
}

impl FirestoreClient {
    pub fn new(client: Client, settings: &AppSettings) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            settings.firebase.firestore_url.trim_end_matches('/'),
            settings.firebase.project_id
        );
        Self { client, documents_url }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn delete_document(&self, path: &str, access_token: &str) -> Result<(), FirestoreClientError> {
        let url = format!("{}/{}", self.documents_url, path);
        debug!("Deleting document {}", path);

        let response = self
            .client
            .delete(&url)
            .query(&[("currentDocument.exists", "true")])
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(FirestoreClientError::NotFound(path.to_string())),
            status => {
                let message = response.text().await.unwrap_or_default();
                error!("Document store error deleting {}: {} - {}", path, status, message);
                Err(FirestoreClientError::Remote {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
