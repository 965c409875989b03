use log::{error, info};
use serde_json::Value;
use std::sync::Arc;

use crate::clients::RemoteProcedure;
use crate::error::AppError;
use crate::models::CreateGuardiaRequest;

pub const CREATE_SECURITY_USER_FUNCTION: &str = "createSecurityUser";

/// Provisions security-staff accounts through a remote function.
#[derive(Clone)]
pub struct GuardiaService {
    functions: Arc<dyn RemoteProcedure>,
}

impl GuardiaService {
    pub fn new(functions: Arc<dyn RemoteProcedure>) -> Self {
        Self { functions }
    }

    /// Creates a guard account. The password check happens before any remote
    /// call; the remote result is returned verbatim and remote errors are
    /// logged and passed on unchanged.
    pub async fn create_guardia(
        &self,
        data: &CreateGuardiaRequest,
        id_token: Option<&str>,
    ) -> Result<Value, AppError> {
        let has_password = data
            .password
            .as_deref()
            .is_some_and(|p| !p.is_empty());
        if !has_password {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        let payload = serde_json::to_value(data)?;

        match self
            .functions
            .call(CREATE_SECURITY_USER_FUNCTION, payload, id_token)
            .await
        {
            Ok(result) => {
                info!("Guard account provisioned for residential {}", data.residencial_id);
                Ok(result)
            }
            Err(e) => {
                error!("{} failed for {}: {}", CREATE_SECURITY_USER_FUNCTION, data.email, e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::FunctionsClientError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFunctions {
        calls: Mutex<Vec<(String, Value, Option<String>)>>,
        fail: bool,
    }

    #[async_trait]
    impl RemoteProcedure for RecordingFunctions {
        async fn call(
            &self,
            name: &str,
            data: Value,
            id_token: Option<&str>,
        ) -> Result<Value, FunctionsClientError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), data.clone(), id_token.map(str::to_string)));
            if self.fail {
                Err(FunctionsClientError::Remote {
                    status: "INTERNAL".to_string(),
                    message: "boom".to_string(),
                })
            } else {
                Ok(json!({ "success": true, "uid": "guard-1", "echo": data }))
            }
        }
    }

    fn request(password: Option<&str>) -> CreateGuardiaRequest {
        CreateGuardiaRequest {
            nombre: "Luis".to_string(),
            apellido_paterno: "Pérez".to_string(),
            apellido_materno: String::new(),
            email: "luis@zentry.mx".to_string(),
            telefono: "5512345678".to_string(),
            password: password.map(str::to_string),
            residencial_id: "res-1".to_string(),
            turno: None,
        }
    }

    #[tokio::test]
    async fn test_missing_password_fails_before_remote_call() {
        let functions = Arc::new(RecordingFunctions::default());
        let service = GuardiaService::new(functions.clone());

        for password in [None, Some("")] {
            let err = service.create_guardia(&request(password), None).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(msg) if msg == "Password is required"));
        }
        assert!(functions.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_passes_full_payload_and_returns_result_verbatim() {
        let functions = Arc::new(RecordingFunctions::default());
        let service = GuardiaService::new(functions.clone());

        let result = service
            .create_guardia(&request(Some("s3cret!")), Some("caller"))
            .await
            .unwrap();

        let calls = functions.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (name, payload, token) = &calls[0];
        assert_eq!(name, CREATE_SECURITY_USER_FUNCTION);
        assert_eq!(payload["password"], "s3cret!");
        assert_eq!(payload["residencialId"], "res-1");
        assert_eq!(token.as_deref(), Some("caller"));
        assert_eq!(result["uid"], "guard-1");
        assert_eq!(result["echo"], *payload);
    }

    #[tokio::test]
    async fn test_remote_error_propagates_without_retry() {
        let functions = Arc::new(RecordingFunctions {
            fail: true,
            ..Default::default()
        });
        let service = GuardiaService::new(functions.clone());

        let err = service
            .create_guardia(&request(Some("pw")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::External(msg) if msg.contains("boom")));
        assert_eq!(functions.calls.lock().unwrap().len(), 1);
    }
}
