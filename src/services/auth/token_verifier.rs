use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;

use crate::config::settings::AppSettings;
use crate::error::AppError;
use crate::models::{AuthContext, AuthenticatedUser, UserClaims};

/// Resolves an opaque session token into the caller's identity and claims.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<AuthContext, AppError>;
}

// Lookup response from the identity provider
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ProviderUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    display_name: Option<String>,
    phone_number: Option<String>,
    custom_attributes: Option<String>,
    created_at: Option<String>,
    last_login_at: Option<String>,
    #[serde(default)]
    disabled: bool,
}

/// Millisecond epoch strings as the provider reports them.
fn parse_millis(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| s.parse::<i64>().ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Verifies ID tokens against the identity provider's account lookup API.
#[derive(Debug, Clone)]
pub struct FirebaseTokenVerifier {
    client: Client,
    lookup_url: String,
    api_key: String,
}

impl FirebaseTokenVerifier {
    pub fn new(client: Client, settings: &AppSettings) -> Self {
        Self {
            client,
            lookup_url: format!(
                "{}/accounts:lookup",
                settings.firebase.identity_toolkit_url.trim_end_matches('/')
            ),
            api_key: settings.firebase.api_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<AuthContext, AppError> {
        debug!("Verifying session token with identity provider");

        let response = self
            .client
            .post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(|e| AppError::External(format!("Failed to verify token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Identity provider rejected token: {} - {}", status, text);
            return Err(AppError::Auth(format!("Invalid token: HTTP {}", status)));
        }

        let lookup: LookupResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Failed to parse verification response: {}", e)))?;

        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Auth("User not found for token".to_string()))?;

        if user.disabled {
            return Err(AppError::Auth("User account is disabled".to_string()));
        }

        let claims = UserClaims::from_custom_attributes(user.custom_attributes.as_deref());

        let authenticated = AuthenticatedUser {
            uid: user.local_id,
            email: user.email.unwrap_or_default(),
            email_verified: user.email_verified,
            display_name: user.display_name,
            phone_number: user.phone_number,
            created_at: parse_millis(user.created_at.as_deref()),
            last_login_at: parse_millis(user.last_login_at.as_deref()),
            id_token: id_token.to_string(),
        };

        debug!("Session token verified for user {}", authenticated.uid);
        Ok(AuthContext::authenticated(authenticated, claims))
    }
}
