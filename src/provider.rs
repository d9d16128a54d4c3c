//! Capture provider: validates access once and builds session controllers
//! that share its gate and scoring client.

use crate::access::AccessGate;
use crate::api::dev_access::{AccessValidator, DevAccessClient};
use crate::api::neuroprofile::{NeuroprofileClient, NeuroprofileService};
use crate::config::Config;
use crate::keystroke::{AndroidRecorder, DesktopRecorder, IosRecorder, TargetPlatform};
use crate::session::{AndroidSession, DesktopSession, IosSession, PlatformSession};
use std::sync::Arc;

pub struct CaptureProvider {
    config: Config,
    gate: AccessGate,
    client: Arc<dyn NeuroprofileService>,
}

impl CaptureProvider {
    /// Validate the configured credentials against the dev-access service
    /// and connect to the configured scoring service.
    pub async fn initialize(config: Config) -> Self {
        let validator = DevAccessClient::new(config.devkey_base_url.clone());
        let client = Arc::new(NeuroprofileClient::new(config.api_base_url.clone()));
        Self::with_services(config, client, &validator).await
    }

    pub async fn with_services(
        config: Config,
        client: Arc<dyn NeuroprofileService>,
        validator: &dyn AccessValidator,
    ) -> Self {
        let gate = AccessGate::initialize(
            config.credentials.as_ref(),
            config.allow_without_credentials,
            validator,
        )
        .await;
        Self::from_parts(config, gate, client)
    }

    /// Build a provider around an already decided gate.
    pub fn from_parts(config: Config, gate: AccessGate, client: Arc<dyn NeuroprofileService>) -> Self {
        Self {
            config,
            gate,
            client,
        }
    }

    pub fn can_access(&self) -> bool {
        self.gate.can_access()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn desktop_session(&self) -> DesktopSession {
        DesktopSession::new(
            DesktopRecorder::new(self.config.time_zone.clone()),
            self.gate,
            Arc::clone(&self.client),
            self.config.app_context(),
        )
        .with_end_session_on_enter(self.config.end_session_on_enter)
    }

    pub fn ios_session(&self) -> IosSession {
        IosSession::new(
            IosRecorder::new(self.config.time_zone.clone()),
            self.gate,
            Arc::clone(&self.client),
            self.config.app_context(),
        )
    }

    pub fn android_session(&self) -> AndroidSession {
        AndroidSession::new(
            AndroidRecorder::new(self.config.time_zone.clone()),
            self.gate,
            Arc::clone(&self.client),
            self.config.app_context(),
        )
    }

    /// Controller for `target`, desktop when unspecified.
    pub fn session_for(&self, target: Option<TargetPlatform>) -> PlatformSession {
        match target.unwrap_or_default() {
            TargetPlatform::Desktop => PlatformSession::Desktop(self.desktop_session()),
            TargetPlatform::Ios => PlatformSession::Ios(self.ios_session()),
            TargetPlatform::Android => PlatformSession::Android(self.android_session()),
        }
    }
}
