// src/engine.rs
//! # Triage Engine
//! Owns the working set and the processing store, and drives each mail
//! through Idle → Processing → {Done | Error}. Every mutating operation
//! takes `&mut self`: one logical thread of control, with the analysis call
//! and the source fetch as the only suspension points.
//!
//! Bulk commits run strictly sequentially, one analysis in flight at a time,
//! with per-id failure isolation: a failing mail stays in the working set in
//! state Error, the rest of the batch proceeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analyze::{AnalysisFailure, AnalysisResult, DynAnalysisClient};
use crate::commit::{CommitSink, CommittedRecord};
use crate::inbox::types::{IncomingMail, MailId, MailSource};
use crate::inbox::{AdmitOutcome, Inbox};
use crate::store::{ProcessingState, ProcessingStore};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("triage_analyses_total", "Analysis calls completed.");
        describe_counter!("triage_analysis_failures_total", "Analysis calls failed.");
        describe_counter!("triage_commits_total", "Records handed to the sink.");
    });
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("mail {0} is not in the working set")]
    UnknownMail(MailId),
    #[error("mail {0} already has an analysis in flight")]
    AlreadyProcessing(MailId),
    #[error(transparent)]
    Analysis(#[from] AnalysisFailure),
}

/// Per-batch outcome of [`TriageEngine::bulk_commit`]: which ids were handed
/// to the sink, and why the rest were not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub committed: Vec<MailId>,
    pub failed: BTreeMap<MailId, String>,
}

pub struct TriageEngine {
    inbox: Inbox,
    store: ProcessingStore,
    client: DynAnalysisClient,
    sink: Arc<dyn CommitSink>,
}

impl TriageEngine {
    pub fn new(client: DynAnalysisClient, sink: Arc<dyn CommitSink>) -> Self {
        ensure_metrics_described();
        Self {
            inbox: Inbox::new(),
            store: ProcessingStore::new(),
            client,
            sink,
        }
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn store(&self) -> &ProcessingStore {
        &self.store
    }

    /// Pull the latest mails from `source` and admit the ones whose id is not
    /// already present. Existing mails keep their state untouched.
    pub async fn fetch_new(&mut self, source: &dyn MailSource) -> anyhow::Result<AdmitOutcome> {
        let fetched = source.fetch_latest().await?;
        let outcome = self.inbox.admit(fetched);
        info!(
            source = source.name(),
            admitted = outcome.admitted,
            duplicates = outcome.duplicates,
            "fetched mails"
        );
        Ok(outcome)
    }

    /// Admit mails directly (tests, replay). Same dedup rules as a fetch.
    pub fn admit(&mut self, mails: Vec<IncomingMail>) -> AdmitOutcome {
        self.inbox.admit(mails)
    }

    /// Drive one mail through a full analysis: mark Processing (clearing any
    /// prior error), await the analysis client, record Done or Error.
    ///
    /// Returns the fresh result so bulk orchestration can chain straight into
    /// a commit without a second store read. At most one analysis may be in
    /// flight per id: a call while Processing is rejected.
    pub async fn process(&mut self, id: &MailId) -> Result<AnalysisResult, ProcessError> {
        let mail = self
            .inbox
            .get(id)
            .cloned()
            .ok_or_else(|| ProcessError::UnknownMail(id.clone()))?;
        if self.store.state(id) == ProcessingState::Processing {
            return Err(ProcessError::AlreadyProcessing(id.clone()));
        }

        self.store.set_processing(id);
        match self.client.analyze(&mail.body, &mail.sender).await {
            Ok(result) => {
                // Always recorded, even if the operator navigated away while
                // the call was in flight; the store is indexed by id.
                self.store.set_result(id, result.clone());
                counter!("triage_analyses_total").increment(1);
                info!(mail = %id, provider = self.client.provider_name(), "analysis done");
                Ok(result)
            }
            Err(err) => {
                self.store.set_error(id, err.to_string());
                counter!("triage_analysis_failures_total").increment(1);
                warn!(mail = %id, error = %err, "analysis failed");
                Err(err.into())
            }
        }
    }

    /// On-focus hook: called by the operator surface when a mail comes into
    /// view. Starts an analysis when the mail is Idle or Error; no action
    /// when Processing or Done, so repeated focus is idempotent.
    pub async fn focus(&mut self, id: &MailId) -> Result<Option<AnalysisResult>, ProcessError> {
        match self.store.state(id) {
            ProcessingState::Idle | ProcessingState::Error => self.process(id).await.map(Some),
            ProcessingState::Processing | ProcessingState::Done => Ok(None),
        }
    }

    /// Operator edit of the draft response; only effective while Done.
    pub fn set_draft(&mut self, id: &MailId, new_draft: impl Into<String>) {
        self.store.mutate_draft(id, new_draft);
    }

    /// Commit a single Done mail: hand `{mail, result}` to the sink and drop
    /// the id from the working set and the store. Returns the new entry id,
    /// or `None` when the mail is absent (stale commit) or has no result yet;
    /// both are silent no-ops, never an error.
    pub fn commit(&mut self, id: &MailId) -> Option<uuid::Uuid> {
        if !self.inbox.contains(id) {
            return None;
        }
        let result = self.store.result(id).cloned()?;
        Some(self.commit_ready(id, result))
    }

    /// Commit a batch in the given order, analyzing unanalyzed mails inline,
    /// one at a time. A mail either lands fully in the sink and leaves the
    /// working set, or stays untouched apart from its Error state.
    pub async fn bulk_commit(&mut self, ids: &[MailId]) -> BulkReport {
        let mut report = BulkReport::default();
        for id in ids {
            // Gone in the meantime: stale commit is a silent no-op.
            if !self.inbox.contains(id) {
                continue;
            }

            let result = match self.store.result(id).cloned() {
                Some(existing) => existing,
                None => match self.process(id).await {
                    Ok(fresh) => fresh,
                    Err(err) => {
                        report.failed.insert(id.clone(), err.to_string());
                        continue;
                    }
                },
            };

            self.commit_ready(id, result);
            report.committed.push(id.clone());
        }

        if !report.failed.is_empty() {
            warn!(
                committed = report.committed.len(),
                failed = report.failed.len(),
                "bulk commit finished with failures"
            );
        }
        report
    }

    /// Atomic per-id commit of a mail known to be present with a result.
    fn commit_ready(&mut self, id: &MailId, result: AnalysisResult) -> uuid::Uuid {
        let mail = self.inbox.remove(id).expect("caller checked presence");
        self.store.remove(id);
        let record = CommittedRecord::new(mail, result);
        let entry_id = record.entry_id;
        self.sink.deliver(record);
        counter!("triage_commits_total").increment(1);
        info!(mail = %id, entry = %entry_id, "committed");
        entry_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::MockAnalyst;
    use crate::commit::MemorySink;
    use crate::inbox::types::{IncomingMail, MailPlatform};
    use chrono::Utc;

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

    fn mk_engine(client: MockAnalyst) -> (TriageEngine, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let engine = TriageEngine::new(Arc::new(client), sink.clone());
        (engine, sink)
    }

    #[tokio::test]
    async fn process_while_in_flight_is_rejected() {
        let (mut engine, _sink) = mk_engine(MockAnalyst::succeeding());
        engine.admit(vec![mk_mail("a")]);

        // Simulate an in-flight analysis for the same id.
        engine.store.set_processing(&"a".into());

        let err = engine.process(&"a".into()).await.unwrap_err();
        assert!(matches!(err, ProcessError::AlreadyProcessing(_)));
        assert_eq!(engine.store().state(&"a".into()), ProcessingState::Processing);
    }

    #[tokio::test]
    async fn process_unknown_mail_is_an_error() {
        let (mut engine, _sink) = mk_engine(MockAnalyst::succeeding());
        let err = engine.process(&"ghost".into()).await.unwrap_err();
        assert!(matches!(err, ProcessError::UnknownMail(_)));
    }

    #[tokio::test]
    async fn single_commit_of_a_stale_id_is_a_noop() {
        let (mut engine, sink) = mk_engine(MockAnalyst::succeeding());
        assert!(engine.commit(&"gone".into()).is_none());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn single_commit_without_result_is_a_noop() {
        let (mut engine, sink) = mk_engine(MockAnalyst::succeeding());
        engine.admit(vec![mk_mail("a")]);
        assert!(engine.commit(&"a".into()).is_none());
        assert!(sink.is_empty());
        assert!(engine.inbox().contains(&"a".into()));
    }
}
