use serde::{Deserialize, Serialize};

use super::user_profile::Role;

/// How the applicant authenticated with the identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    #[default]
    Email,
    Google,
}

/// Body of `POST /api/register`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub auth_method: AuthMethod,
    pub email: Option<String>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub residential: ResidentialInfo,
    #[serde(default)]
    pub documents: Documents,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonalInfo {
    pub first_name: Option<String>,
    pub paternal_last_name: Option<String>,
    pub maternal_last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResidentialInfo {
    pub residential_id: Option<String>,
    pub house_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Documents {
    pub identification_url: Option<String>,
    pub proof_of_address_url: Option<String>,
}

/// Normalized record handed to the account-creation step.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub email: String,
    pub first_name: String,
    pub paternal_last_name: String,
    pub maternal_last_name: String,
    pub phone: String,
    pub residential_id: String,
    pub house_id: String,
    pub role: Role,
    pub auth_method: AuthMethod,
    pub identification_url: Option<String>,
    pub proof_of_address_url: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub user_data: UserData,
}
