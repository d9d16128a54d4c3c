//! Session controllers.
//!
//! Each platform wrapper forwards raw input events to its keystroke manager
//! while capture is allowed, keeps the visible text value, and runs the
//! shared submission protocol in [`SessionCore`].

pub mod android;
pub mod core;
pub mod desktop;
pub mod ios;
pub mod result;

pub use android::{AndroidEvent, AndroidSession};
pub use self::core::{PendingRecord, SessionCore, SessionState};
pub use desktop::{DesktopEvent, DesktopSession};
pub use ios::{IosEvent, IosSession};
pub use result::{CaptureError, ErrorMessage, KeystrokeResult};

use crate::api::actions::ActionSelection;
use crate::keystroke::{CapturePayload, TargetPlatform};
use serde::Deserialize;

/// A raw input event for one of the platform controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Desktop(DesktopEvent),
    Ios(IosEvent),
    Android(AndroidEvent),
}

/// A recorded sequence of input events for one platform.
///
/// ```json
/// { "platform": "ios", "events": [{ "type": "keyup", "key": "a" }] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EventScript {
    pub platform: TargetPlatform,
    pub events: Vec<serde_json::Value>,
}

impl EventScript {
    /// Decode every event for the script's platform.
    pub fn into_events(self) -> Result<Vec<CaptureEvent>, serde_json::Error> {
        let platform = self.platform;
        self.events
            .into_iter()
            .map(|event| {
                Ok(match platform {
                    TargetPlatform::Desktop => CaptureEvent::Desktop(serde_json::from_value(event)?),
                    TargetPlatform::Ios => CaptureEvent::Ios(serde_json::from_value(event)?),
                    TargetPlatform::Android => CaptureEvent::Android(serde_json::from_value(event)?),
                })
            })
            .collect()
    }
}

/// The controller selected for a target platform.
pub enum PlatformSession {
    Desktop(DesktopSession),
    Ios(IosSession),
    Android(AndroidSession),
}

impl PlatformSession {
    pub fn platform(&self) -> TargetPlatform {
        match self {
            PlatformSession::Desktop(_) => TargetPlatform::Desktop,
            PlatformSession::Ios(_) => TargetPlatform::Ios,
            PlatformSession::Android(_) => TargetPlatform::Android,
        }
    }

    /// Forward `event` to the controller. Events for another platform are
    /// ignored and reported as `false`.
    pub fn process_event(&self, event: &CaptureEvent) -> bool {
        match (self, event) {
            (PlatformSession::Desktop(session), CaptureEvent::Desktop(event)) => {
                if let Some(Ok(payload)) = session.process_event(event) {
                    tracing::info!(
                        session_id = payload.session_id(),
                        "Session finalized on Enter"
                    );
                }
            }
            (PlatformSession::Ios(session), CaptureEvent::Ios(event)) => session.process_event(event),
            (PlatformSession::Android(session), CaptureEvent::Android(event)) => {
                session.process_event(event)
            }
            _ => {
                tracing::warn!(platform = %self.platform(), "Event for another platform ignored");
                return false;
            }
        }
        true
    }

    /// Finalize locally, with the empty-session outcome reported uniformly.
    pub fn end_typing_session(&self) -> Result<CapturePayload, ErrorMessage> {
        match self {
            PlatformSession::Desktop(session) => session.end_typing_session(),
            PlatformSession::Android(session) => session.end_typing_session(),
            PlatformSession::Ios(session) => session.core().end_typing_session_local().map_err(Into::into),
        }
    }

    pub async fn submit(
        &self,
        user_uid: &str,
        user_token: &str,
        actions: impl Into<ActionSelection>,
    ) -> KeystrokeResult {
        match self {
            PlatformSession::Desktop(session) => session.submit(user_uid, user_token, actions).await,
            PlatformSession::Ios(session) => session.submit(user_uid, user_token, actions).await,
            PlatformSession::Android(session) => session.submit(user_uid, user_token, actions).await,
        }
    }

    pub fn text_value(&self) -> String {
        match self {
            PlatformSession::Desktop(session) => session.text_value(),
            PlatformSession::Ios(session) => session.text_value(),
            PlatformSession::Android(session) => session.text_value(),
        }
    }

    pub fn is_typing_session_active(&self) -> bool {
        match self {
            PlatformSession::Desktop(session) => session.is_typing_session_active(),
            PlatformSession::Ios(session) => session.is_typing_session_active(),
            PlatformSession::Android(session) => session.is_typing_session_active(),
        }
    }
}
