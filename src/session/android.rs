//! Android session controller.

use crate::access::AccessGate;
use crate::api::actions::ActionSelection;
use crate::api::neuroprofile::NeuroprofileService;
use crate::keystroke::{AndroidKeystrokeManager, AndroidRecorder, CapturePayload, InputTarget};
use crate::session::core::SessionCore;
use crate::session::result::{ErrorMessage, KeystrokeResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raw events from an Android virtual keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AndroidEvent {
    /// Fired before the input mutates, with the value the input reports
    BeforeInput { current_value: String },
    Keydown { target: InputTarget },
    Keyup,
    /// Input content right after a key press
    KeyInput { content: String },
    Paste { text: String },
    InputChange { value: String },
}

/// Wraps an [`AndroidKeystrokeManager`] with gating and the shared
/// submission protocol.
pub struct AndroidSession<M = AndroidRecorder> {
    core: SessionCore<M>,
}

impl<M: AndroidKeystrokeManager> AndroidSession<M> {
    pub fn new(
        manager: M,
        gate: AccessGate,
        client: Arc<dyn NeuroprofileService>,
        app_context: impl Into<String>,
    ) -> Self {
        Self {
            core: SessionCore::new(manager, gate, client, app_context),
        }
    }

    pub fn core(&self) -> &SessionCore<M> {
        &self.core
    }

    /// Snapshot the text before the input mutates. The stored text value
    /// takes precedence over what the input reports.
    pub fn process_before_input(&self, current_value: &str) {
        self.core.capture(|state| {
            state
                .manager
                .process_before_input(current_value, &state.text_value)
        });
    }

    pub fn process_keydown(&self, target: &InputTarget) {
        self.core.capture(|state| state.manager.process_keydown(target));
    }

    pub fn process_keyup(&self) {
        self.core.capture(|state| state.manager.process_keyup());
    }

    pub fn process_key_input(&self, content: &str) {
        self.core
            .capture(|state| state.manager.process_key_input(content));
    }

    pub fn process_paste(&self, text: &str) {
        self.core.capture(|state| state.manager.process_paste(text));
    }

    pub fn process_input_change(&self, value: &str) {
        self.core
            .capture(|state| state.text_value = value.to_string());
    }

    pub fn process_event(&self, event: &AndroidEvent) {
        match event {
            AndroidEvent::BeforeInput { current_value } => self.process_before_input(current_value),
            AndroidEvent::Keydown { target } => self.process_keydown(target),
            AndroidEvent::Keyup => self.process_keyup(),
            AndroidEvent::KeyInput { content } => self.process_key_input(content),
            AndroidEvent::Paste { text } => self.process_paste(text),
            AndroidEvent::InputChange { value } => self.process_input_change(value),
        }
    }

    /// Finalize the session without submitting it.
    pub fn end_typing_session(&self) -> Result<CapturePayload, ErrorMessage> {
        self.core.end_typing_session_local().map_err(|err| {
            tracing::warn!("{}", err);
            ErrorMessage::from(err)
        })
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
