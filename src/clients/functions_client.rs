use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::settings::AppSettings;

#[derive(Debug, thiserror::Error)]
pub enum FunctionsClientError {
    #[error("remote function failed with {status}: {message}")]
    Remote { status: String, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// A named serverless function reachable over the network.
#[async_trait]
pub trait RemoteProcedure: Send + Sync {
    /// Invokes `name` with `data` and returns the function's result untouched.
    async fn call(
        &self,
        name: &str,
        data: Value,
        id_token: Option<&str>,
    ) -> Result<Value, FunctionsClientError>;
}

#[derive(Debug, Deserialize)]
struct CallableError {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for HTTPS callable functions pinned to one region.
#[derive(Debug, Clone)]
pub struct CallableFunctionsClient {
    client: Client,
    base_url: String,
}

impl CallableFunctionsClient {
    pub fn new(client: Client, settings: &AppSettings) -> Self {
        Self {
            client,
            base_url: settings.firebase.functions_url(),
        }
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RemoteProcedure for CallableFunctionsClient {
    async fn call(
        &self,
        name: &str,
        data: Value,
        id_token: Option<&str>,
    ) -> Result<Value, FunctionsClientError> {
        let url = format!("{}/{}", self.base_url, name);
        debug!("Invoking callable function {}", name);

        let mut request = self.client.post(&url).json(&json!({ "data": data }));
        if let Some(token) = id_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Kept as a map: `"result": null` is a valid reply and must stay
        // distinct from a missing `result` key
        let mut parsed = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                error!("Callable function {} returned a non-object body (HTTP {})", name, status);
                return Err(FunctionsClientError::MalformedResponse(format!(
                    "HTTP {}: expected a JSON object",
                    status
                )));
            }
            Err(e) => {
                error!("Callable function {} returned unparseable body (HTTP {}): {}", name, status, e);
                return Err(FunctionsClientError::MalformedResponse(format!("HTTP {}: {}", status, e)));
            }
        };

        if let Some(raw) = parsed.remove("error").filter(|e| !e.is_null()) {
            let err: CallableError = serde_json::from_value(raw).map_err(|e| {
                FunctionsClientError::MalformedResponse(format!("HTTP {}: bad error object: {}", status, e))
            })?;
            return Err(FunctionsClientError::Remote {
                status: err.status.unwrap_or_else(|| status.as_u16().to_string()),
                message: err.message.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        if !status.is_success() {
            return Err(FunctionsClientError::Remote {
                status: status.as_u16().to_string(),
                message: body,
            });
        }

        parsed
            .remove("result")
            .ok_or_else(|| FunctionsClientError::MalformedResponse("missing result field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_call_wraps_data_and_unwraps_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/createSecurityUser")
            .match_header("authorization", "Bearer caller-token")
            .match_body(Matcher::Json(json!({ "data": { "email": "g@example.com" } })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":{"uid":"new-guard","ok":true}}"#)
            .create_async()
            .await;

        let client = CallableFunctionsClient::with_base_url(Client::new(), &server.url());
        let result = client
            .call("createSecurityUser", json!({ "email": "g@example.com" }), Some("caller-token"))
            .await
            .unwrap();

        assert_eq!(result, json!({ "uid": "new-guard", "ok": true }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/createSecurityUser")
            .with_status(400)
            .with_body(r#"{"error":{"status":"ALREADY_EXISTS","message":"email already in use"}}"#)
            .create_async()
            .await;

        let client = CallableFunctionsClient::with_base_url(Client::new(), &server.url());
        let err = client
            .call("createSecurityUser", json!({}), None)
            .await
            .unwrap_err();

        match err {
            FunctionsClientError::Remote { status, message } => {
                assert_eq!(status, "ALREADY_EXISTS");
                assert_eq!(message, "email already in use");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_result_is_returned_not_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/createSecurityUser")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":null}"#)
            .create_async()
            .await;

        let client = CallableFunctionsClient::with_base_url(Client::new(), &server.url());
        let result = client.call("createSecurityUser", json!({}), None).await.unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_missing_result_key_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/createSecurityUser")
            .with_status(200)
            .with_body(r#"{"data":{"uid":"x"}}"#)
            .create_async()
            .await;

        let client = CallableFunctionsClient::with_base_url(Client::new(), &server.url());
        let err = client.call("createSecurityUser", json!({}), None).await.unwrap_err();
        assert!(matches!(err, FunctionsClientError::MalformedResponse(msg) if msg.contains("missing result")));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/createSecurityUser")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let client = CallableFunctionsClient::with_base_url(Client::new(), &server.url());
        let err = client.call("createSecurityUser", json!({}), None).await.unwrap_err();
        assert!(matches!(err, FunctionsClientError::MalformedResponse(_)));
    }
}
