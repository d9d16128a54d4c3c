//! Integration tests for the submission protocol of the session controllers.

use area2_capture_agent::api::CheckAccessKeyResponse;
use area2_capture_agent::config::CredentialsConfig;
use area2_capture_agent::{
    A2Action, AccessGate, AccessValidator, ActionSelection, CaptureProvider,
    CapturePayload, Config, DesktopSession, KeystrokeResult, NeuroprofileResponse,
    NeuroprofileService, TargetPlatform,
};
use area2_capture_agent::keystroke::DesktopRecorder;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq)]
struct Call {
    user_uid: String,
    user_token: String,
    session_id: String,
    actions: Vec<String>,
    app_context: Option<String>,
}

/// Records every request and holds it until a permit is released.
struct SpyService {
    permits: Semaphore,
    calls: Mutex<Vec<Call>>,
    response: NeuroprofileResponse,
}

impl SpyService {
    fn blocking(response: NeuroprofileResponse) -> Arc<Self> {
        Arc::new(Self {
            permits: Semaphore::new(0),
            calls: Mutex::new(Vec::new()),
            response,
        })
    }

    fn immediate(response: NeuroprofileResponse) -> Arc<Self> {
        Arc::new(Self {
            permits: Semaphore::new(Semaphore::MAX_PERMITS),
            calls: Mutex::new(Vec::new()),
            response,
        })
    }

    fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.calls.lock().unwrap().len() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("scoring service was not called in time");
    }
}

#[async_trait]
impl NeuroprofileService for SpyService {
    async fn get_reduced_neuroprofile(
        &self,
        user_uid: &str,
        user_token: &str,
        payload: &CapturePayload,
        actions: &ActionSelection,
    ) -> NeuroprofileResponse {
        self.calls.lock().unwrap().push(Call {
            user_uid: user_uid.to_string(),
            user_token: user_token.to_string(),
            session_id: payload.session_id().to_string(),
            actions: actions.wire_names().into_iter().map(str::to_string).collect(),
            app_context: payload.app_context().map(str::to_string),
        });
        self.permits.acquire().await.unwrap().forget();
        self.response.clone()
    }
}

struct Grant;

#[async_trait]
impl AccessValidator for Grant {
    async fn validate_dev_access_key(&self, _access_key: &str) -> CheckAccessKeyResponse {
        CheckAccessKeyResponse::granted()
    }
}

fn desktop(service: Arc<SpyService>, gate: AccessGate) -> Arc<DesktopSession> {
    Arc::new(DesktopSession::new(
        DesktopRecorder::new("UTC"),
        gate,
        service,
        "linux - test",
    ))
}

fn type_text(session: &DesktopSession, text: &str) {
    let mut value = session.text_value();
    for c in text.chars() {
        let key = c.to_string();
        session.process_keydown(&key);
        value.push(c);
        session.process_input_change(&value);
        session.process_keyup(&key);
    }
}

fn compare_response() -> NeuroprofileResponse {
    let envelope = json!({
        "self_compare_scores": {"average_pos": 1, "current_pos": 2},
        "timestamp": "T"
    });
    NeuroprofileResponse::Success {
        neuroprofile: Some(area2_capture_agent::Neuroprofile::narrow("a2_compare", envelope)),
    }
}

#[tokio::test]
async fn test_compare_submission_result() {
    let service = SpyService::immediate(compare_response());
    let session = desktop(service.clone(), AccessGate::allowed());
    type_text(&session, "hello");

    let result = session.submit("user-1", "tok-1", A2Action::Compare).await;
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"data":{"self_compare_scores":{"average_pos":1,"current_pos":2},"timestamp":"T"}}"#
    );

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].actions, vec!["a2_compare".to_string()]);
    assert_eq!(calls[0].app_context.as_deref(), Some("linux - test"));
    assert!(session.text_value().is_empty());
    assert!(!session.is_typing_session_active());
}

#[tokio::test]
async fn test_missing_credentials_submission() {
    let service = SpyService::immediate(compare_response());
    let session = desktop(service.clone(), AccessGate::allowed());
    type_text(&session, "hi");

    let result = session.submit("", "", A2Action::Compare).await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"error": "User credentials not found.", "message": "Skipping save..."})
    );
    assert!(service.calls().is_empty());
    assert!(!session.core().is_submitting());
    assert!(session.core().pending_session_id().is_none());
}

#[tokio::test]
async fn test_empty_submission_never_reaches_service() {
    let service = SpyService::immediate(compare_response());
    let session = desktop(service.clone(), AccessGate::allowed());

    let result = session.submit("u", "t", A2Action::Default).await;
    assert_eq!(result.error().unwrap().error, "Empty typing data");
    assert!(service.calls().is_empty());

    // The slot is free again.
    type_text(&session, "ok");
    let result = session.submit("u", "t", A2Action::Default).await;
    assert!(!result.is_error());
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn test_closed_gate_records_and_sends_nothing() {
    let service = SpyService::immediate(compare_response());
    let session = desktop(service.clone(), AccessGate::denied());
    type_text(&session, "secret");

    assert!(!session.is_typing_session_active());
    let result = session.submit("u", "t", A2Action::Compare).await;
    assert!(result.is_error());
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_fresh_session_id_after_each_end() {
    let service = SpyService::immediate(compare_response());
    let session = desktop(service, AccessGate::allowed());

    type_text(&session, "one");
    let first = session.end_typing_session().unwrap();
    type_text(&session, "two");
    let second = session.end_typing_session().unwrap();

    assert_ne!(first.session_id(), second.session_id());
    assert_eq!(second.keystroke_count(), 3);
}

#[tokio::test]
async fn test_concurrent_submissions_merge_and_flush() {
    let service = SpyService::blocking(compare_response());
    let session = desktop(service.clone(), AccessGate::allowed());

    type_text(&session, "first");
    let in_flight = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit("u1", "t1", A2Action::Compare).await })
    };
    service.wait_for_calls(1).await;
    assert!(session.core().is_submitting());

    // Second submission is finalized into the pending slot.
    type_text(&session, "second");
    let merged = session.submit("u2", "t2", A2Action::Summary).await;
    assert_eq!(merged, KeystrokeResult::Merged);
    let pending_id = session
        .core()
        .pending_session_id()
        .expect("second session should be pending");

    // Third submission only refreshes the pending credentials.
    type_text(&session, "third");
    let merged = session.submit("u3", "t3", A2Action::Trends).await;
    assert_eq!(merged, KeystrokeResult::Merged);
    assert_eq!(session.core().pending_session_id(), Some(pending_id.clone()));
    // The slot was taken, so the third session stays open.
    assert!(session.is_typing_session_active());
    assert_eq!(service.calls().len(), 1);

    service.release(2);
    let result = in_flight.await.unwrap();
    assert!(result.neuroprofile().is_some());

    service.wait_for_calls(2).await;
    let calls = service.calls();
    assert_eq!(
        calls[1],
        Call {
            user_uid: "u3".to_string(),
            user_token: "t3".to_string(),
            session_id: pending_id,
            actions: vec!["default".to_string()],
            app_context: Some("linux - test".to_string()),
        }
    );
    assert!(!session.core().is_submitting());
    assert!(!session.core().has_pending());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test]
async fn test_timed_out_submission_frees_slot() {
    let service = SpyService::blocking(compare_response());
    let session = desktop(service.clone(), AccessGate::allowed());
    type_text(&session, "first");

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        session.submit("u1", "t1", A2Action::Compare),
    )
    .await;
    assert!(timed_out.is_err());
    assert!(!session.core().is_submitting());

    service.release(1);
    type_text(&session, "second");
    let result = session.submit("u2", "t2", A2Action::Compare).await;
    assert_ne!(result, KeystrokeResult::Merged);
    assert!(result.neuroprofile().is_some());

    let calls = service.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].user_uid, "u2");
}

#[tokio::test]
async fn test_aborted_submission_still_flushes_pending() {
    let service = SpyService::blocking(compare_response());
    let session = desktop(service.clone(), AccessGate::allowed());

    type_text(&session, "first");
    let in_flight = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit("u1", "t1", A2Action::Compare).await })
    };
    service.wait_for_calls(1).await;

    type_text(&session, "second");
    let merged = session.submit("u2", "t2", A2Action::Summary).await;
    assert_eq!(merged, KeystrokeResult::Merged);
    let pending_id = session.core().pending_session_id().unwrap();

    in_flight.abort();
    assert!(in_flight.await.unwrap_err().is_cancelled());
    assert!(!session.core().is_submitting());
    assert!(!session.core().has_pending());

    service.release(1);
    service.wait_for_calls(2).await;
    let calls = service.calls();
    assert_eq!(calls[1].session_id, pending_id);
    assert_eq!(calls[1].user_uid, "u2");
    assert_eq!(calls[1].actions, vec!["default".to_string()]);
}

#[tokio::test]
async fn test_merge_of_empty_session_is_discarded() {
    let service = SpyService::blocking(compare_response());
    let session = desktop(service.clone(), AccessGate::allowed());

    type_text(&session, "first");
    let in_flight = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit("u1", "t1", A2Action::Default).await })
    };
    service.wait_for_calls(1).await;

    let merged = session.submit("u2", "t2", A2Action::Default).await;
    assert_eq!(merged, KeystrokeResult::Merged);
    assert!(session.core().pending_session_id().is_none());

    service.release(1);
    in_flight.await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn test_provider_builds_gated_sessions() {
    let service = SpyService::immediate(compare_response());
    let config = Config {
        credentials: Some(CredentialsConfig {
            api_key: "dev-key".to_string(),
        }),
        ..Config::default()
    };
    let provider = CaptureProvider::with_services(config, service.clone(), &Grant).await;
    assert!(provider.can_access());

    let session = provider.session_for(Some(TargetPlatform::Android));
    assert_eq!(session.platform(), TargetPlatform::Android);

    let err = session.end_typing_session().unwrap_err();
    assert_eq!(err.error, "Empty typing data");
    assert!(err.message.ends_with(". Skipping..."));
}
