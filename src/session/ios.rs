//! iOS session controller.

use crate::access::AccessGate;
use crate::api::actions::ActionSelection;
use crate::api::neuroprofile::NeuroprofileService;
use crate::keystroke::{CapturePayload, InputTarget, IosKeystrokeManager, IosRecorder};
use crate::session::core::{SessionCore, SessionState};
use crate::session::result::KeystrokeResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raw events from an iOS virtual keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IosEvent {
    Keydown { key: String, target: InputTarget },
    Keyup { key: String },
    Paste { text: String },
    /// Content length observed just before the input mutates
    BeforeInput { content_length: usize },
    /// New input value; checked for both prediction and autocorrect
    InputChange { value: String },
    PredictionCheck { value: String },
    AutocorrectCheck { value: String },
}

/// Wraps an [`IosKeystrokeManager`] with gating, text snapshots and the
/// shared submission protocol.
pub struct IosSession<M = IosRecorder> {
    core: SessionCore<M>,
}

impl<M: IosKeystrokeManager> IosSession<M> {
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

    pub fn process_keydown(&self, key: &str, target: &InputTarget) {
        self.core
            .capture(|state| state.manager.process_keydown(key, target));
    }

    pub fn process_keyup(&self, key: &str) {
        self.core.capture(|state| state.manager.process_keyup(key));
    }

    pub fn process_paste(&self, text: &str) {
        self.core.capture(|state| state.manager.process_paste(text));
    }

    pub fn process_before_input(&self, content_length: usize) {
        self.core
            .capture(|state| state.manager.set_prev_content_length(content_length));
    }

    /// Store `value` as the visible text and hand the manager the text it
    /// replaced.
    fn with_snapshot(&self, value: &str, f: impl FnOnce(&mut M, &str)) {
        self.core.capture(|state: &mut SessionState<M>| {
            let previous = std::mem::replace(&mut state.text_value, value.to_string());
            f(&mut state.manager, &previous);
        });
    }

    pub fn process_input_change(&self, value: &str) {
        self.with_snapshot(value, |manager, previous| {
            manager.process_prediction(value, previous);
            manager.process_autocorrection(value, previous);
        });
    }

    pub fn check_prediction(&self, value: &str) {
        self.with_snapshot(value, |manager, previous| {
            manager.process_prediction(value, previous)
        });
    }

    pub fn check_autocorrection(&self, value: &str) {
        self.with_snapshot(value, |manager, previous| {
            manager.process_autocorrection(value, previous)
        });
    }

    pub fn process_event(&self, event: &IosEvent) {
        match event {
            IosEvent::Keydown { key, target } => self.process_keydown(key, target),
            IosEvent::Keyup { key } => self.process_keyup(key),
            IosEvent::Paste { text } => self.process_paste(text),
            IosEvent::BeforeInput { content_length } => self.process_before_input(*content_length),
            IosEvent::InputChange { value } => self.process_input_change(value),
            IosEvent::PredictionCheck { value } => self.check_prediction(value),
            IosEvent::AutocorrectCheck { value } => self.check_autocorrection(value),
        }
    }

    /// Finalize the session without submitting it. An empty session is
    /// logged and yields `None`.
    pub fn end_typing_session(&self) -> Option<CapturePayload> {
        match self.core.end_typing_session_local() {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::warn!("{}", err);
                None
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::NeuroprofileResponse;
    use async_trait::async_trait;

    struct NoopService;

    #[async_trait]
    impl NeuroprofileService for NoopService {
        async fn get_reduced_neuroprofile(
            &self,
            _user_uid: &str,
            _user_token: &str,
            _payload: &CapturePayload,
            _actions: &ActionSelection,
        ) -> NeuroprofileResponse {
            NeuroprofileResponse::Success { neuroprofile: None }
        }
    }

    fn session() -> IosSession {
        gated_session(AccessGate::allowed())
    }

    fn gated_session(gate: AccessGate) -> IosSession {
        IosSession::new(IosRecorder::new("UTC"), gate, Arc::new(NoopService), "ios - test")
    }

    fn type_char(session: &IosSession, c: char) {
        let before = session.text_value();
        let key = c.to_string();
        session.process_before_input(before.chars().count());
        session.process_keydown(&key, &InputTarget::new(before.as_str()));
        session.process_input_change(&format!("{before}{c}"));
        session.process_keyup(&key);
    }

    fn mobile(payload: CapturePayload) -> crate::keystroke::MobileKeystrokeCollection {
        match payload {
            CapturePayload::Mobile(record) => record,
            CapturePayload::Desktop(_) => panic!("expected a mobile record"),
        }
    }

    #[test]
    fn test_prediction_uses_previous_text() {
        let session = session();
        type_char(&session, 'h');
        type_char(&session, 'e');
        session.process_before_input(2);
        session.process_input_change("hello ");

        assert_eq!(session.text_value(), "hello ");
        let record = mobile(session.end_typing_session().unwrap());
        assert_eq!(record.prediction_lengths, vec![4]);
        assert!(record.autocorrect_lengths.is_empty());
        assert_eq!(record.press_times.len(), 2);
    }

    #[test]
    fn test_autocorrect_check() {
        let session = session();
        for c in "teh".chars() {
            type_char(&session, c);
        }
        session.check_autocorrection("the");

        let record = mobile(session.end_typing_session().unwrap());
        assert_eq!(record.autocorrect_lengths, vec![3]);
        assert_eq!(record.app_context.as_deref(), Some("ios - test"));
    }

    #[test]
    fn test_denied_gate_ignores_events() {
        let session = gated_session(AccessGate::denied());
        type_char(&session, 'a');
        session.process_paste("pasted words");
        session.process_input_change("a pasted words");
        session.check_prediction("a pasted words ");
        session.check_autocorrection("A pasted words");

        assert!(session.text_value().is_empty());
        assert!(!session.is_typing_session_active());
        assert!(session.end_typing_session().is_none());
    }

    #[test]
    fn test_empty_end_yields_none() {
        let session = session();
        assert!(session.end_typing_session().is_none());
    }

    #[test]
    fn test_event_json() {
        let event: IosEvent = serde_json::from_str(
            r#"{"type": "keydown", "key": "a", "target": {"value": "", "selection_start": 0, "selection_end": 0}}"#,
        )
        .unwrap();
        session().process_event(&event);
    }
}
