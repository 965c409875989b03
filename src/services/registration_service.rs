use chrono::{SecondsFormat, Utc};
use log::info;

use crate::error::AppError;
use crate::models::{RegistrationRequest, Role, UserData};

pub const PENDING_STATUS: &str = "pending";

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn or_empty(value: &Option<String>) -> String {
    non_blank(value).unwrap_or_default().to_string()
}

/// Fails when email, first name or residential unit is absent or blank.
pub fn validate(payload: &RegistrationRequest) -> Result<(), AppError> {
    let missing: Vec<&str> = [
        ("email", non_blank(&payload.email)),
        ("personalInfo.firstName", non_blank(&payload.personal_info.first_name)),
        ("residential.residentialId", non_blank(&payload.residential.residential_id)),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.is_none().then_some(name))
    .collect();

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Maps a validated payload onto the record consumed by account creation.
///
/// Optional name parts, phone and house default to the empty string; absent
/// document URLs stay `None`. Nothing is persisted.
pub fn prepare(payload: &RegistrationRequest) -> Result<UserData, AppError> {
    validate(payload)?;

    Ok(UserData {
        email: or_empty(&payload.email).to_lowercase(),
        first_name: or_empty(&payload.personal_info.first_name),
        paternal_last_name: or_empty(&payload.personal_info.paternal_last_name),
        maternal_last_name: or_empty(&payload.personal_info.maternal_last_name),
        phone: or_empty(&payload.personal_info.phone),
        residential_id: or_empty(&payload.residential.residential_id),
        house_id: or_empty(&payload.residential.house_id),
        role: Role::User,
        auth_method: payload.auth_method,
        identification_url: non_blank(&payload.documents.identification_url).map(str::to_string),
        proof_of_address_url: non_blank(&payload.documents.proof_of_address_url).map(str::to_string),
        status: PENDING_STATUS.to_string(),
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Validates and normalizes a registration in one step.
pub fn intake(payload: &RegistrationRequest) -> Result<UserData, AppError> {
    let user_data = prepare(payload)?;
    info!(
        "Registration accepted for residential {} via {:?}",
        user_data.residential_id, user_data.auth_method
    );
    Ok(user_data)
}
