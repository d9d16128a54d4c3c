//! Access gate: one-shot credential validation that enables capture.

use crate::api::dev_access::AccessValidator;
use crate::config::CredentialsConfig;

/// Whether capture is allowed for this process.
///
/// Decided once when the provider starts; there is no refresh or
/// revocation afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessGate {
    can_access: bool,
}

impl AccessGate {
    /// Closed gate, the state before validation.
    pub fn denied() -> Self {
        Self { can_access: false }
    }

    pub fn allowed() -> Self {
        Self { can_access: true }
    }

    pub fn can_access(&self) -> bool {
        self.can_access
    }

    /// Run the initial validation.
    ///
    /// - no credentials: open only if `allow_without_credentials`
    /// - empty key: closed without contacting the service
    /// - otherwise: whatever the validator answers
    pub async fn initialize(
        credentials: Option<&CredentialsConfig>,
        allow_without_credentials: bool,
        validator: &dyn AccessValidator,
    ) -> Self {
        let Some(credentials) = credentials else {
            if allow_without_credentials {
                tracing::info!("No credentials configured; capture allowed");
                return Self::allowed();
            }
            tracing::warn!("No credentials configured; capture disabled");
            return Self::denied();
        };

        if credentials.api_key.trim().is_empty() {
            tracing::warn!("Empty API key; capture disabled");
            return Self::denied();
        }

        let response = validator
            .validate_dev_access_key(&credentials.api_key)
            .await;
        if response.ok {
            tracing::info!("Access key validated; capture allowed");
            Self::allowed()
        } else {
            tracing::warn!(
                "Access key rejected: {}",
                response.error.as_deref().unwrap_or("unknown reason")
            );
            Self::denied()
        }
    }
}
