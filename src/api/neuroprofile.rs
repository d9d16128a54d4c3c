//! Neuroprofile client: posts finished sessions to the scoring service.

use crate::api::actions::ActionSelection;
use crate::api::payload::NeuroprofileRequest;
use crate::api::response::{select_result, ApiEnvelope, ApiStatus, Neuroprofile, NeuroprofileResponse};
use crate::api::{endpoint_url, ApiError};
use crate::keystroke::types::CapturePayload;
use async_trait::async_trait;

/// Message attached to every transport-level failure.
pub const CONNECTION_ERROR_MESSAGE: &str = "Error when connecting to api";

const NEUROPROFILE_PATH: &str = "get_reduced_neuroprofile";

/// Anything that can score a finished typing session.
///
/// Implementations must not fail: every outcome, including transport
/// errors, is expressed as a [`NeuroprofileResponse`].
#[async_trait]
pub trait NeuroprofileService: Send + Sync {
    async fn get_reduced_neuroprofile(
        &self,
        user_uid: &str,
        user_token: &str,
        payload: &CapturePayload,
        actions: &ActionSelection,
    ) -> NeuroprofileResponse;
}

/// HTTP client for `POST <base_url>/get_reduced_neuroprofile`.
#[derive(Debug, Clone)]
pub struct NeuroprofileClient {
    base_url: String,
    client: reqwest::Client,
}

impl NeuroprofileClient {
    /// Create a client for the given base URL. Transport timeouts are left
    /// at the reqwest defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the scoring endpoint.
    pub fn endpoint(&self) -> String {
        endpoint_url(&self.base_url, NEUROPROFILE_PATH)
    }

    async fn post(
        &self,
        user_uid: &str,
        user_token: &str,
        payload: &CapturePayload,
        actions: &ActionSelection,
    ) -> Result<ApiEnvelope, ApiError> {
        let request = NeuroprofileRequest::new(user_uid, payload, actions);

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {user_token}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ApiEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message.or(envelope.error))
                .unwrap_or(body);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ApiEnvelope>()
            .await
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// Turn a decoded envelope into the typed response for `actions`.
pub(crate) fn interpret(envelope: ApiEnvelope, actions: &ActionSelection) -> NeuroprofileResponse {
    match envelope.status {
        ApiStatus::Error => NeuroprofileResponse::Failure {
            error: envelope.error.unwrap_or_default(),
            message: envelope.message.unwrap_or_default(),
        },
        ApiStatus::Success => {
            let mut results = envelope.results.unwrap_or_default();
            let Some((action, value)) = select_result(&mut results, actions) else {
                tracing::warn!(
                    actions = ?actions.wire_names(),
                    "Neuroprofile response has no result for the requested action"
                );
                return NeuroprofileResponse::Success { neuroprofile: None };
            };

            NeuroprofileResponse::Success {
                neuroprofile: Some(Neuroprofile::narrow(&action, value)),
            }
        }
    }
}

#[async_trait]
impl NeuroprofileService for NeuroprofileClient {
    async fn get_reduced_neuroprofile(
        &self,
        user_uid: &str,
        user_token: &str,
        payload: &CapturePayload,
        actions: &ActionSelection,
    ) -> NeuroprofileResponse {
        tracing::debug!(
            session_id = payload.session_id(),
            platform = ?payload.platform(),
            actions = ?actions.wire_names(),
            "Requesting reduced neuroprofile"
        );

        match self.post(user_uid, user_token, payload, actions).await {
            Ok(envelope) => interpret(envelope, actions),
            Err(e) => {
                tracing::error!("{}: {}", CONNECTION_ERROR_MESSAGE, e);
                NeuroprofileResponse::failure(e.to_string(), CONNECTION_ERROR_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::actions::A2Action;
    use serde_json::json;

    fn envelope(value: serde_json::Value) -> ApiEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let client = NeuroprofileClient::new("https://scoring.example.com/");
        assert_eq!(
            client.endpoint(),
            "https://scoring.example.com/get_reduced_neuroprofile"
        );
    }

    #[test]
    fn test_interpret_success_selects_requested_action() {
        let response = interpret(
            envelope(json!({
                "status": "success",
                "results": {
                    "default": {"timestamp": "T0", "user_id": "u1"},
                    "a2_compare": {
                        "self_compare_scores": {"average_pos": 1, "current_pos": 2},
                        "timestamp": "T"
                    }
                }
            })),
            &ActionSelection::Single(A2Action::Compare),
        );

        let NeuroprofileResponse::Success {
            neuroprofile: Some(Neuroprofile::Compare(compare)),
        } = &response
        else {
            panic!("expected compare neuroprofile, got {response:?}");
        };
        assert_eq!(compare.timestamp, "T");
        assert_eq!(
            compare.raw(),
            &json!({"self_compare_scores": {"average_pos": 1, "current_pos": 2}, "timestamp": "T"})
        );
    }

    #[test]
    fn test_interpret_error_status() {
        let response = interpret(
            envelope(json!({"status": "error", "error": "Unauthorized", "message": "Bad token"})),
            &ActionSelection::default(),
        );
        assert_eq!(response, NeuroprofileResponse::failure("Unauthorized", "Bad token"));
        assert!(!response.is_ok());
    }

    #[test]
    fn test_interpret_missing_action_is_not_an_error() {
        let response = interpret(
            envelope(json!({"status": "success", "results": {}})),
            &ActionSelection::Single(A2Action::Trends),
        );
        assert_eq!(response, NeuroprofileResponse::Success { neuroprofile: None });
    }

    #[test]
    fn test_interpret_unexpected_shape_is_passed_through() {
        let response = interpret(
            envelope(json!({"status": "success", "results": {"a2_summary": {"timestamp": 3}}})),
            &ActionSelection::Single(A2Action::Summary),
        );
        let NeuroprofileResponse::Success {
            neuroprofile: Some(profile),
        } = &response
        else {
            panic!("expected a neuroprofile, got {response:?}");
        };
        assert!(matches!(profile, Neuroprofile::Other { .. }));
        assert_eq!(serde_json::to_value(profile).unwrap(), json!({"timestamp": 3}));
    }
}
