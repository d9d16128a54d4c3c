//! Desktop session controller.

use crate::access::AccessGate;
use crate::api::actions::ActionSelection;
use crate::api::neuroprofile::NeuroprofileService;
use crate::keystroke::{CapturePayload, DesktopKeystrokeManager, DesktopRecorder};
use crate::session::core::{SessionCore, SessionState};
use crate::session::result::{ErrorMessage, KeystrokeResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Raw events from a physical keyboard and its text input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DesktopEvent {
    Keydown { key: String },
    Keyup { key: String },
    InputChange { value: String },
}

/// Wraps a [`DesktopKeystrokeManager`] with gating and the shared
/// submission protocol.
pub struct DesktopSession<M = DesktopRecorder> {
    core: SessionCore<M>,
    end_session_on_enter: bool,
    last_payload: Mutex<Option<CapturePayload>>,
}

impl<M: DesktopKeystrokeManager> DesktopSession<M> {
    pub fn new(
        manager: M,
        gate: AccessGate,
        client: Arc<dyn NeuroprofileService>,
        app_context: impl Into<String>,
    ) -> Self {
        Self {
            core: SessionCore::new(manager, gate, client, app_context),
            end_session_on_enter: false,
            last_payload: Mutex::new(None),
        }
    }

    /// Finalize the session locally whenever Enter is released.
    pub fn with_end_session_on_enter(mut self, enabled: bool) -> Self {
        self.end_session_on_enter = enabled;
        self
    }

    pub fn core(&self) -> &SessionCore<M> {
        &self.core
    }

    fn capture<R>(&self, event: &'static str, f: impl FnOnce(&mut SessionState<M>) -> R) -> Option<R> {
        let result = self.core.capture(f);
        if result.is_none() {
            tracing::warn!(event, "Capture not allowed; desktop event ignored");
        }
        result
    }

    pub fn process_keydown(&self, key: &str) {
        self.capture("keydown", |state| state.manager.process_keydown(key));
    }

    /// Record a key release. With `end_session_on_enter`, releasing Enter
    /// also finalizes the session and returns the local result.
    pub fn process_keyup(&self, key: &str) -> Option<Result<CapturePayload, ErrorMessage>> {
        self.capture("keyup", |state| state.manager.process_keyup(key))?;
        if self.end_session_on_enter && key == "Enter" {
            return Some(self.end_typing_session());
        }
        None
    }

    pub fn process_input_change(&self, value: &str) {
        self.capture("input_change", |state| {
            state.manager.process_input_change(value);
            state.text_value = value.to_string();
        });
    }

    pub fn process_event(&self, event: &DesktopEvent) -> Option<Result<CapturePayload, ErrorMessage>> {
        match event {
            DesktopEvent::Keydown { key } => {
                self.process_keydown(key);
                None
            }
            DesktopEvent::Keyup { key } => self.process_keyup(key),
            DesktopEvent::InputChange { value } => {
                self.process_input_change(value);
                None
            }
        }
    }

    /// Finalize the session without submitting it. A successful record is
    /// also kept as [`last_payload`](Self::last_payload).
    pub fn end_typing_session(&self) -> Result<CapturePayload, ErrorMessage> {
        match self.core.end_typing_session_local() {
            Ok(payload) => {
                *self
                    .last_payload
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(payload.clone());
                Ok(payload)
            }
            Err(err) => {
                tracing::warn!("{}", err);
                Err(err.into())
            }
        }
    }

    /// Last record finalized with [`end_typing_session`](Self::end_typing_session).
    pub fn last_payload(&self) -> Option<CapturePayload> {
        self.last_payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn submit(
        &self,
        user_uid: &str,
        user_token: &str,
        actions: impl Into<ActionSelection>,
    ) -> KeystrokeResult {
        self.core.submit(user_uid, user_token, actions).await
    }

    pub fn text_value(&self) -> String {
        self.core.text_value()
    }

    pub fn is_typing_session_active(&self) -> bool {
        self.core.is_typing_session_active()
    }
}
