//! Platform-independent session lifecycle: gated capture, local
//! finalization, and the submit/merge/flush protocol.

use crate::access::AccessGate;
use crate::api::actions::ActionSelection;
use crate::api::neuroprofile::NeuroprofileService;
use crate::api::response::NeuroprofileResponse;
use crate::keystroke::{CapturePayload, KeystrokeManager};
use crate::session::result::{CaptureError, KeystrokeResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A finalized session waiting for the in-flight submission to finish.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub payload: CapturePayload,
    pub user_uid: String,
    pub user_token: String,
}

/// Mutable state guarded by the controller lock.
#[derive(Debug)]
pub struct SessionState<M> {
    pub manager: M,
    /// Current visible text of the captured input
    pub text_value: String,
    in_flight: bool,
    pending: Option<PendingRecord>,
}

enum Submission {
    Ready(CapturePayload),
    Rejected(CaptureError),
    Merged,
}

#[cfg(test)]
impl Submission {
    fn is_ready(&self) -> bool {
        matches!(self, Submission::Ready(_))
    }
}

/// Holds the in-flight slot for one submission. Dropping it frees the slot
/// and flushes the pending record, also when the submitting future is
/// cancelled mid-request.
struct InFlight<'a, M: KeystrokeManager> {
    core: &'a SessionCore<M>,
}

impl<M: KeystrokeManager> Drop for InFlight<'_, M> {
    fn drop(&mut self) {
        if let Some(pending) = self.core.release() {
            self.core.flush(pending);
        }
    }
}

/// Session controller shared by the desktop, iOS and Android wrappers.
///
/// At most one submission is in flight per controller. A submission that
/// arrives meanwhile is finalized into a single pending slot and flushed
/// with the default action once the in-flight request completes.
pub struct SessionCore<M> {
    state: Mutex<SessionState<M>>,
    gate: AccessGate,
    client: Arc<dyn NeuroprofileService>,
    app_context: String,
}

impl<M: KeystrokeManager> SessionCore<M> {
    pub fn new(
        manager: M,
        gate: AccessGate,
        client: Arc<dyn NeuroprofileService>,
        app_context: impl Into<String>,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState {
                manager,
                text_value: String::new(),
                in_flight: false,
                pending: None,
            }),
            gate,
            client,
            app_context: app_context.into(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<M>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn can_access(&self) -> bool {
        self.gate.can_access()
    }

    /// Run `f` against the controller state if capture is allowed.
    /// Returns `None` when the gate is closed and nothing was touched.
    pub fn capture<R>(&self, f: impl FnOnce(&mut SessionState<M>) -> R) -> Option<R> {
        if !self.gate.can_access() {
            return None;
        }
        Some(f(&mut self.lock()))
    }

    pub fn text_value(&self) -> String {
        self.lock().text_value.clone()
    }

    pub fn is_typing_session_active(&self) -> bool {
        self.lock().manager.is_typing_session_active()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().in_flight
    }

    pub fn has_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Id of the session waiting in the pending slot, if any.
    pub fn pending_session_id(&self) -> Option<String> {
        self.lock()
            .pending
            .as_ref()
            .map(|pending| pending.payload.session_id().to_string())
    }

    fn finalize(&self, state: &mut SessionState<M>) -> CapturePayload {
        let mut payload = state.manager.end_typing_session();
        if !payload.is_empty() {
            payload.set_app_context(self.app_context.clone());
        }
        payload
    }

    /// Finalize the open session without sending it anywhere.
    pub fn end_typing_session_local(&self) -> Result<CapturePayload, CaptureError> {
        let mut state = self.lock();
        state.text_value.clear();
        let payload = self.finalize(&mut state);
        state.manager.reset_typing_data();

        if payload.is_empty() {
            return Err(CaptureError::EmptySession {
                session_id: payload.session_id().to_string(),
            });
        }
        tracing::debug!(
            session_id = payload.session_id(),
            keystrokes = payload.keystroke_count(),
            "Typing session finalized locally"
        );
        Ok(payload)
    }

    /// Finalize the open session and score it.
    ///
    /// Returns [`KeystrokeResult::Merged`] when another submission is still
    /// in flight; the session is then kept for the follow-up flush.
    pub async fn submit(
        &self,
        user_uid: &str,
        user_token: &str,
        actions: impl Into<ActionSelection>,
    ) -> KeystrokeResult {
        let actions = actions.into();
        let payload = match self.begin_submission(user_uid, user_token) {
            Submission::Ready(payload) => payload,
            Submission::Rejected(err) => return err.into(),
            Submission::Merged => return KeystrokeResult::Merged,
        };
        let slot = InFlight { core: self };

        let response = self
            .client
            .get_reduced_neuroprofile(user_uid, user_token, &payload, &actions)
            .await;

        drop(slot);
        response.into()
    }

    fn begin_submission(&self, user_uid: &str, user_token: &str) -> Submission {
        let mut state = self.lock();
        state.text_value.clear();

        if state.in_flight {
            self.merge(&mut state, user_uid, user_token);
            return Submission::Merged;
        }

        state.in_flight = true;
        let payload = self.finalize(&mut state);
        state.manager.reset_typing_data();

        if payload.is_empty() {
            state.in_flight = false;
            let err = CaptureError::EmptySession {
                session_id: payload.session_id().to_string(),
            };
            tracing::warn!("{}", err);
            return Submission::Rejected(err);
        }
        if user_uid.is_empty() || user_token.is_empty() {
            state.in_flight = false;
            tracing::warn!(
                session_id = payload.session_id(),
                "User credentials not found; session dropped"
            );
            return Submission::Rejected(CaptureError::MissingCredentials);
        }

        tracing::debug!(
            session_id = payload.session_id(),
            keystrokes = payload.keystroke_count(),
            "Submitting typing session"
        );
        Submission::Ready(payload)
    }

    fn merge(&self, state: &mut SessionState<M>, user_uid: &str, user_token: &str) {
        match state.pending.as_mut() {
            Some(pending) => {
                // Slot taken: only the credentials move. This session stays
                // open and goes out with the next submission.
                pending.user_uid = user_uid.to_string();
                pending.user_token = user_token.to_string();
                tracing::debug!(
                    session_id = pending.payload.session_id(),
                    "Pending session credentials updated"
                );
            }
            None => {
                let payload = self.finalize(state);
                if payload.is_empty() {
                    tracing::debug!(
                        session_id = payload.session_id(),
                        "Empty session discarded during merge"
                    );
                } else {
                    tracing::debug!(
                        session_id = payload.session_id(),
                        "Session queued behind in-flight submission"
                    );
                    state.pending = Some(PendingRecord {
                        payload,
                        user_uid: user_uid.to_string(),
                        user_token: user_token.to_string(),
                    });
                }
            }
        }
        state.manager.reset_typing_data();
    }

    fn release(&self) -> Option<PendingRecord> {
        let mut state = self.lock();
        state.in_flight = false;
        state.pending.take()
    }

    fn flush(&self, pending: PendingRecord) {
        if pending.user_uid.is_empty() || pending.user_token.is_empty() {
            tracing::warn!(
                session_id = pending.payload.session_id(),
                "User credentials not found; pending session dropped"
            );
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                session_id = pending.payload.session_id(),
                "No async runtime available; pending session dropped"
            );
            return;
        };

        let client = Arc::clone(&self.client);
        handle.spawn(async move {
            let session_id = pending.payload.session_id().to_string();
            let response = client
                .get_reduced_neuroprofile(
                    &pending.user_uid,
                    &pending.user_token,
                    &pending.payload,
                    &ActionSelection::default(),
                )
                .await;
            match response {
                NeuroprofileResponse::Success { .. } => {
                    tracing::debug!(session_id = %session_id, "Pending session flushed")
                }
                NeuroprofileResponse::Failure { error, message } => tracing::warn!(
                    session_id = %session_id,
                    "Pending session flush failed: {} ({})",
                    message,
                    error
                ),
            }
        });
    }
}
