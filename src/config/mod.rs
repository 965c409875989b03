pub mod settings;

use tracing::info;

pub use settings::AppSettings;

/// Reads the server, backend and admin-credential settings from the
/// environment. Missing project ID or API key is fatal.
pub fn init_config() -> Result<AppSettings, Box<dyn std::error::Error>> {
    let config = AppSettings::from_env()?;
    info!(
        project = %config.firebase.project_id,
        environment = %config.app.environment,
        admin_credential = config.admin.service_account_key.is_some(),
        "configuration loaded"
    );
    Ok(config)
}
