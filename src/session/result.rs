//! Results returned by the session controllers.

use crate::api::response::{Neuroprofile, NeuroprofileResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EMPTY_TYPING_DATA: &str = "Empty typing data";
pub const MISSING_CREDENTIALS: &str = "User credentials not found.";
pub const SKIPPING_SAVE: &str = "Skipping save...";

/// Why a session did not produce a neuroprofile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The finalized record holds no keystrokes.
    #[error("Empty typing data for session: {session_id}. Skipping...")]
    EmptySession { session_id: String },

    /// A valid record arrived without a user id or token.
    #[error("Skipping save...")]
    MissingCredentials,

    /// Transport failure or `status: error` from the scoring service.
    #[error("{message}")]
    Remote { error: String, message: String },
}

impl CaptureError {
    /// Short title reported in the `error` field.
    pub fn title(&self) -> &str {
        match self {
            CaptureError::EmptySession { .. } => EMPTY_TYPING_DATA,
            CaptureError::MissingCredentials => MISSING_CREDENTIALS,
            CaptureError::Remote { error, .. } => error,
        }
    }
}

/// Caller-facing error shape: `{ "error": ..., "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: String,
    pub message: String,
}

impl From<&CaptureError> for ErrorMessage {
    fn from(err: &CaptureError) -> Self {
        Self {
            error: err.title().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<CaptureError> for ErrorMessage {
    fn from(err: CaptureError) -> Self {
        ErrorMessage::from(&err)
    }
}

/// Outcome of `submit`.
///
/// Serializes to the shapes callers already consume: `{"data": ...}`,
/// `{"error": ..., "message": ...}`, or `null` for a merged submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeystrokeResult {
    Data {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Neuroprofile>,
    },
    Error(ErrorMessage),
    /// Another submission was in flight; the session was queued for flush.
    Merged,
}

impl KeystrokeResult {
    pub fn is_error(&self) -> bool {
        matches!(self, KeystrokeResult::Error(_))
    }

    pub fn neuroprofile(&self) -> Option<&Neuroprofile> {
        match self {
            KeystrokeResult::Data { data } => data.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorMessage> {
        match self {
            KeystrokeResult::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl From<CaptureError> for KeystrokeResult {
    fn from(err: CaptureError) -> Self {
        KeystrokeResult::Error(err.into())
    }
}

impl From<NeuroprofileResponse> for KeystrokeResult {
    fn from(response: NeuroprofileResponse) -> Self {
        match response {
            NeuroprofileResponse::Success { neuroprofile } => KeystrokeResult::Data {
                data: neuroprofile,
            },
            NeuroprofileResponse::Failure { error, message } => {
                CaptureError::Remote { error, message }.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_session_message() {
        let err = CaptureError::EmptySession {
            session_id: "abc".to_string(),
        };
        let message = ErrorMessage::from(&err);
        assert_eq!(message.error, "Empty typing data");
        assert_eq!(message.message, "Empty typing data for session: abc. Skipping...");
    }

    #[test]
    fn test_missing_credentials_shape() {
        let result = KeystrokeResult::from(CaptureError::MissingCredentials);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"error": "User credentials not found.", "message": "Skipping save..."})
        );
    }

    #[test]
    fn test_remote_failure_keeps_fields() {
        let result = KeystrokeResult::from(NeuroprofileResponse::failure(
            "timeout",
            "Error when connecting to api",
        ));
        let error = result.error().unwrap();
        assert_eq!(error.error, "timeout");
        assert_eq!(error.message, "Error when connecting to api");
    }

    #[test]
    fn test_missing_neuroprofile_serializes_without_data() {
        let result = KeystrokeResult::from(NeuroprofileResponse::Success { neuroprofile: None });
        assert!(!result.is_error());
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({}));
        assert_eq!(serde_json::to_value(KeystrokeResult::Merged).unwrap(), json!(null));
    }
}
