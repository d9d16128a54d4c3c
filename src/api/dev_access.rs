//! Developer access key validation (`GET /check-client-access-key`).

use crate::api::{endpoint_url, ApiError};
use async_trait::async_trait;
use serde::Deserialize;

const CHECK_ACCESS_KEY_PATH: &str = "check-client-access-key";

/// Body returned by the dev-access endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DevAccessKeyBody {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of validating an access key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckAccessKeyResponse {
    pub ok: bool,
    pub error: Option<String>,
}

impl CheckAccessKeyResponse {
    pub fn granted() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(reason.into()),
        }
    }
}

/// Validates developer access keys.
#[async_trait]
pub trait AccessValidator: Send + Sync {
    async fn validate_dev_access_key(&self, access_key: &str) -> CheckAccessKeyResponse;
}

/// HTTP validator backed by the dev-access service.
#[derive(Debug, Clone)]
pub struct DevAccessClient {
    base_url: String,
    client: reqwest::Client,
}

impl DevAccessClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        endpoint_url(&self.base_url, CHECK_ACCESS_KEY_PATH)
    }

    async fn check(&self, access_key: &str) -> Result<DevAccessKeyBody, ApiError> {
        if self.base_url.is_empty() {
            return Err(ApiError::Config(
                "dev-access base URL is not configured".to_string(),
            ));
        }

        let response = self
            .client
            .get(self.endpoint())
            .header("Authorization", format!("Bearer {access_key}"))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Rejections usually come back as non-2xx with the same body shape.
        match serde_json::from_str::<DevAccessKeyBody>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ApiError::Server {
                status: status.as_u16(),
                message: body,
            }),
            Err(e) => Err(ApiError::Serialization(e.to_string())),
        }
    }
}

#[async_trait]
impl AccessValidator for DevAccessClient {
    async fn validate_dev_access_key(&self, access_key: &str) -> CheckAccessKeyResponse {
        match self.check(access_key).await {
            Ok(body) if body.success => CheckAccessKeyResponse::granted(),
            Ok(body) => CheckAccessKeyResponse::denied(
                body.error
                    .unwrap_or_else(|| "Access key rejected".to_string()),
            ),
            Err(e) => {
                tracing::error!("Dev access validation failed: {}", e);
                CheckAccessKeyResponse::denied(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let client = DevAccessClient::new("https://devkeys.example.com");
        assert_eq!(
            client.endpoint(),
            "https://devkeys.example.com/check-client-access-key"
        );
    }

    #[tokio::test]
    async fn test_missing_base_url_denies() {
        let client = DevAccessClient::new("");
        let response = client.validate_dev_access_key("key").await;
        assert!(!response.ok);
        assert!(response.error.unwrap().contains("not configured"));
    }

    #[test]
    fn test_body_parsing() {
        let body: DevAccessKeyBody =
            serde_json::from_str(r#"{"success": false, "error": "revoked"}"#).unwrap();
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("revoked"));
    }
}
