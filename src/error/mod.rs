use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::error::Error as StdError;

use crate::clients::firestore_client::FirestoreClientError;
use crate::clients::functions_client::FunctionsClientError;

#[derive(Debug)]
pub enum AppError {
    Internal(String),
    Auth(String),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Configuration(String),
    Validation(String),
    External(String),
    Serialization(String),
    ServiceUnavailable(String),
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    code: u16,
    message: String,
    error_type: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::Auth(e) => write!(f, "Authentication error: {}", e),
            AppError::Unauthorized(e) => write!(f, "Unauthorized: {}", e),
            AppError::NotFound(e) => write!(f, "Not found: {}", e),
            AppError::BadRequest(e) => write!(f, "Bad request: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::Validation(e) => write!(f, "Validation error: {}", e),
            AppError::External(e) => write!(f, "External service error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::ServiceUnavailable(e) => write!(f, "Service unavailable: {}", e),
        }
    }
}

impl StdError for AppError {}

impl AppError {
    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::External(_) => (StatusCode::BAD_GATEWAY, "external_service_error"),
            AppError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error"),
            AppError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_type) = self.kind();

        let error_response = ErrorResponse {
            code: status_code.as_u16(),
            message: self.to_string(),
            error_type: error_type.to_string(),
        };

        HttpResponse::build(status_code).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.kind().0
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Serialization(format!("JSON deserialization/serialization error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::External(format!("HTTP request failed: {}", error))
    }
}

impl From<FunctionsClientError> for AppError {
    fn from(error: FunctionsClientError) -> Self {
        match error {
            FunctionsClientError::Remote { status, message } => {
                AppError::External(format!("Remote function error ({}): {}", status, message))
            }
            FunctionsClientError::Transport(e) => {
                AppError::External(format!("Remote function call failed: {}", e))
            }
            FunctionsClientError::MalformedResponse(msg) => {
                AppError::External(format!("Malformed remote function response: {}", msg))
            }
        }
    }
}

impl From<FirestoreClientError> for AppError {
    fn from(error: FirestoreClientError) -> Self {
        match error {
            FirestoreClientError::NotFound(path) => {
                AppError::NotFound(format!("Document not found: {}", path))
            }
            FirestoreClientError::Remote { status, message } => {
                AppError::External(format!("Document store error ({}): {}", status, message))
            }
            FirestoreClientError::Transport(e) => {
                AppError::External(format!("Document store request failed: {}", e))
            }
        }
    }
}

// Define AppResult type alias for Result<T, AppError>
pub type AppResult<T> = Result<T, AppError>;
