// tests/engine_state.rs
//
// Per-mail state machine: Idle → Processing → {Done | Error}, retry
// semantics, and the idempotent on-focus auto-trigger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use inbox_triage::analyze::{AnalysisClient, AnalysisFailure, AnalysisResult, MockAnalyst};
use inbox_triage::commit::MemorySink;
use inbox_triage::engine::{ProcessError, TriageEngine};
use inbox_triage::inbox::types::{IncomingMail, MailPlatform};
use inbox_triage::store::ProcessingState;

/// Scripted client: fails the first `fail_first` calls with a numbered
/// message, then succeeds. Counts every call it receives.
struct StubAnalyst {
    fail_first: usize,
    calls: AtomicUsize,
}

impl StubAnalyst {
    fn new(fail_first: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_first,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisClient for StubAnalyst {
    async fn analyze(
        &self,
        _content: &str,
        sender: &str,
    ) -> Result<AnalysisResult, AnalysisFailure> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_first {
            Err(AnalysisFailure::MalformedResponse(format!("failure #{n}")))
        } else {
            Ok(MockAnalyst::canned_result(sender))
        }
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

fn mk_mail(id: &str) -> IncomingMail {
    IncomingMail {
        id: id.into(),
        sender: format!("{id}@example.com"),
        sender_name: "Test Sender".into(),
        subject: "Sujet".into(),
        body: "Corps du message".into(),
        received_at: Utc::now(),
        platform: MailPlatform::Gmail,
    }
}

fn mk_engine(client: Arc<StubAnalyst>) -> TriageEngine {
    TriageEngine::new(client, Arc::new(MemorySink::new()))
}

#[tokio::test]
async fn successful_process_lands_in_done_with_the_result() {
    let stub = StubAnalyst::new(0);
    let mut engine = mk_engine(stub.clone());
    engine.admit(vec![mk_mail("a")]);
    let id = "a".into();

    assert_eq!(engine.store().state(&id), ProcessingState::Idle);
    let returned = engine.process(&id).await.expect("analysis should succeed");

    assert_eq!(engine.store().state(&id), ProcessingState::Done);
    assert_eq!(engine.store().result(&id), Some(&returned));
    assert!(engine.store().error(&id).is_none());
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn failed_process_lands_in_error_with_the_message() {
    let stub = StubAnalyst::new(1);
    let mut engine = mk_engine(stub);
    engine.admit(vec![mk_mail("a")]);
    let id = "a".into();

    let err = engine.process(&id).await.unwrap_err();
    assert!(matches!(err, ProcessError::Analysis(_)));
    assert_eq!(engine.store().state(&id), ProcessingState::Error);
    assert!(engine.store().result(&id).is_none());
    assert!(engine.store().error(&id).unwrap().contains("failure #1"));
}

#[tokio::test]
async fn retry_clears_the_old_error_then_succeeds() {
    let stub = StubAnalyst::new(1);
    let mut engine = mk_engine(stub.clone());
    engine.admit(vec![mk_mail("a")]);
    let id = "a".into();

    let _ = engine.process(&id).await.unwrap_err();
    assert!(engine.store().error(&id).is_some());

    engine.process(&id).await.expect("retry should succeed");
    assert_eq!(engine.store().state(&id), ProcessingState::Done);
    assert!(engine.store().error(&id).is_none());
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn renewed_failure_overwrites_the_stored_message() {
    let stub = StubAnalyst::new(2);
    let mut engine = mk_engine(stub);
    engine.admit(vec![mk_mail("a")]);
    let id = "a".into();

    let _ = engine.process(&id).await.unwrap_err();
    assert!(engine.store().error(&id).unwrap().contains("failure #1"));

    let _ = engine.process(&id).await.unwrap_err();
    assert!(engine.store().error(&id).unwrap().contains("failure #2"));
}

#[tokio::test]
async fn focus_triggers_on_idle_and_error_only() {
    let stub = StubAnalyst::new(1);
    let mut engine = mk_engine(stub.clone());
    engine.admit(vec![mk_mail("a")]);
    let id = "a".into();

    // Idle → triggers, first call fails.
    assert!(engine.focus(&id).await.is_err());
    assert_eq!(stub.calls(), 1);

    // Error → triggers again, succeeds this time.
    let out = engine.focus(&id).await.expect("second focus");
    assert!(out.is_some());
    assert_eq!(stub.calls(), 2);

    // Done → idempotent, no further analysis call.
    let out = engine.focus(&id).await.expect("third focus");
    assert!(out.is_none());
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn draft_edits_apply_only_while_done() {
    let stub = StubAnalyst::new(0);
    let mut engine = mk_engine(stub);
    engine.admit(vec![mk_mail("a")]);
    let id = "a".into();

    // Before analysis: silently ignored.
    engine.set_draft(&id, "trop tôt");
    assert!(engine.store().result(&id).is_none());

    engine.process(&id).await.unwrap();
    engine.set_draft(&id, "Bonjour,\nbrouillon revu.");
    assert_eq!(
        engine.store().result(&id).unwrap().draft_response,
        "Bonjour,\nbrouillon revu."
    );
}
