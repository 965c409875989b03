use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::{debug, error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::settings::AppSettings;
use crate::error::AppError;
use crate::models::UserClaims;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ADMIN_SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
https://www.googleapis.com/auth/identitytoolkit \
https://www.googleapis.com/auth/datastore";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh this long before the provider-reported expiry
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service-account credential as downloaded from the backend console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Source of bearer tokens for privileged backend calls.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, AppError>;
}

/// Privileged backend access backed by a service account.
///
/// Mints OAuth access tokens from a signed assertion and caches them until
/// shortly before expiry.
pub struct AdminServices {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    project_id: String,
    accounts_update_url: String,
    cached_token: RwLock<Option<CachedToken>>,
}

impl fmt::Debug for AdminServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminServices")
            .field("project_id", &self.project_id)
            .field("client_email", &self.key.client_email)
            .finish()
    }
}

/// Builds admin services from settings.
///
/// A missing or unusable credential is not fatal: it is logged and the
/// admin surface is reported as unavailable.
pub fn init_admin_services(client: Client, settings: &AppSettings) -> Option<Arc<AdminServices>> {
    let raw = match settings.admin.service_account_key.as_deref() {
        Some(raw) => raw,
        None => {
            warn!("FIREBASE_SERVICE_ACCOUNT_KEY is not set; admin services are unavailable");
            return None;
        }
    };

    match AdminServices::from_json(client, raw, settings) {
        Ok(admin) => {
            info!("Admin services initialized for {}", admin.key.client_email);
            Some(Arc::new(admin))
        }
        Err(e) => {
            error!("Failed to initialize admin services: {}", e);
            None
        }
    }
}

impl AdminServices {
    pub fn from_json(client: Client, raw: &str, settings: &AppSettings) -> Result<Self, AppError> {
        let key: ServiceAccountKey = serde_json::from_str(raw)
            .map_err(|e| AppError::Configuration(format!("Invalid service account JSON: {}", e)))?;

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::Configuration(format!("Invalid service account private key: {}", e)))?;

        let project_id = key
            .project_id
            .clone()
            .unwrap_or_else(|| settings.firebase.project_id.clone());

        let accounts_update_url = format!(
            "{}/projects/{}/accounts:update",
            settings.firebase.identity_toolkit_url.trim_end_matches('/'),
            project_id
        );

        Ok(Self {
            client,
            key,
            encoding_key,
            project_id,
            accounts_update_url,
            cached_token: RwLock::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: ADMIN_SCOPES,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign service account assertion: {}", e);
            AppError::Internal(format!("Assertion signing failed: {}", e))
        })
    }

    /// Returns a valid access token, exchanging a fresh assertion when the
    /// cached one is missing or about to expire.
    pub async fn fetch_access_token(&self) -> Result<String, AppError> {
        let now = Utc::now();

        if let Some(cached) = self.cached_token.read().await.as_ref() {
            if cached.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(cached.access_token.clone());
            }
        }

        let mut slot = self.cached_token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(cached) = slot.as_ref() {
            if cached.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(cached.access_token.clone());
            }
        }

        debug!("Exchanging service account assertion for access token");
        let assertion = self.signed_assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Access token exchange failed: {} - {}", status, text);
            return Err(AppError::External(format!("Access token exchange failed: HTTP {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Failed to parse token response: {}", e)))?;

        *slot = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });

        Ok(token.access_token)
    }

    /// Replaces the custom claims of `uid`. Takes effect on the user's next
    /// token refresh.
    pub async fn set_custom_claims(&self, uid: &str, claims: &UserClaims) -> Result<(), AppError> {
        let custom_attributes = claims.to_custom_attributes()?;
        let access_token = self.fetch_access_token().await?;

        let response = self
            .client
            .post(&self.accounts_update_url)
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "localId": uid,
                "customAttributes": custom_attributes,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Failed to set custom claims for {}: {} - {}", uid, status, text);
            return Err(AppError::External(format!("Setting custom claims failed: HTTP {}", status)));
        }

        info!("Custom claims updated for user {}", uid);
        Ok(())
    }
}

#[async_trait]
impl AccessTokenSource for AdminServices {
    async fn access_token(&self) -> Result<String, AppError> {
        self.fetch_access_token().await
    }
}
