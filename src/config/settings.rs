use std::env;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FUNCTIONS_REGION: &str = "us-central1";
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub firebase: FirebaseConfig,
    pub admin: AdminConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: String,
    pub functions_region: String,
    pub identity_toolkit_url: String,
    /// `None` means the regional cloudfunctions.net host for the project
    pub functions_base_url: Option<String>,
    pub firestore_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Raw service-account JSON; admin services are disabled when absent
    pub service_account_key: Option<String>,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl FirebaseConfig {
    pub fn functions_url(&self) -> String {
        match &self.functions_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}-{}.cloudfunctions.net",
                self.functions_region, self.project_id
            ),
        }
    }
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key source; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).ok_or(());

        // App config
        let app_name = var("APP_NAME").unwrap_or_else(|_| "zentry".to_string());
        let environment = var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Server config
        let server_host = var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a valid port number".to_string()))?;

        // CORS origins
        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Firebase
        let project_id = var("FIREBASE_PROJECT_ID")
            .map_err(|_| AppError::Configuration("FIREBASE_PROJECT_ID must be set".to_string()))?;

        let api_key = var("FIREBASE_API_KEY")
            .map_err(|_| AppError::Configuration("FIREBASE_API_KEY must be set".to_string()))?;

        let functions_region = var("FIREBASE_FUNCTIONS_REGION")
            .unwrap_or_else(|_| DEFAULT_FUNCTIONS_REGION.to_string());

        let identity_toolkit_url = var("IDENTITY_TOOLKIT_URL")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_TOOLKIT_URL.to_string());

        let functions_base_url = var("FUNCTIONS_BASE_URL").ok().filter(|s| !s.trim().is_empty());

        let firestore_url = var("FIRESTORE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FIRESTORE_URL.to_string());

        // Admin credentials
        let service_account_key = var("FIREBASE_SERVICE_ACCOUNT_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            app: AppConfig {
                name: app_name,
                environment,
            },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            firebase: FirebaseConfig {
                project_id,
                api_key,
                functions_region,
                identity_toolkit_url,
                functions_base_url,
                firestore_url,
            },
            admin: AdminConfig {
                service_account_key,
            },
        })
    }

    /// Settings for unit tests, pointing every backend URL at `base_url`.
    #[cfg(test)]
    pub fn for_tests(base_url: &str) -> Self {
        Self {
            app: AppConfig {
                name: "zentry".to_string(),
                environment: "development".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            firebase: FirebaseConfig {
                project_id: "zentry-test".to_string(),
                api_key: "test-api-key".to_string(),
                functions_region: DEFAULT_FUNCTIONS_REGION.to_string(),
                identity_toolkit_url: base_url.to_string(),
                functions_base_url: Some(base_url.to_string()),
                firestore_url: base_url.to_string(),
            },
            admin: AdminConfig {
                service_account_key: None,
            },
        }
    }
}
