use log::warn;
use serde::{Deserialize, Serialize};

use super::user_profile::Role;

/// Authorization attributes attached to an authenticated session.
///
/// Set through the identity provider's custom-claims mechanism and only ever
/// read by this service when resolving a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    #[serde(default)]
    pub is_global_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residencial_id: Option<String>,
}

impl UserClaims {
    /// Parses the provider's `customAttributes` JSON string.
    ///
    /// Missing or empty attributes yield the default (no privileges). Malformed
    /// JSON is treated the same way and logged, so a broken claim can never
    /// grant access. Unknown role strings are dropped.
    pub fn from_custom_attributes(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Self::default(),
        };

        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring malformed custom claims: {}", e);
                return Self::default();
            }
        };

        let is_global_admin = value
            .get("isGlobalAdmin")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let role = value
            .get("role")
            .and_then(|v| v.as_str())
            .and_then(|s| match s.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!("Ignoring role claim: {}", e);
                    None
                }
            });

        let residencial_id = value
            .get("residencialId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Self {
            is_global_admin,
            role,
            residencial_id,
        }
    }

    /// Serializes back into the `customAttributes` form the admin API expects.
    pub fn to_custom_attributes(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
