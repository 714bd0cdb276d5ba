// src/commit.rs
//! Commit sink: the only externally observable successful output of the
//! core. Exactly one record per committed mail id.

use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

use crate::analyze::AnalysisResult;
use crate::inbox::types::IncomingMail;

/// A finalized `{mail, result}` pair handed to the sink on commit. The
/// `entry_id` is freshly minted for the downstream record; the mail's own id
/// ceases to exist for the core once the record is delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommittedRecord {
    pub entry_id: Uuid,
    pub mail: IncomingMail,
    pub result: AnalysisResult,
}

impl CommittedRecord {
    pub fn new(mail: IncomingMail, result: AnalysisResult) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            mail,
            result,
        }
    }
}

pub trait CommitSink: Send + Sync {
    fn deliver(&self, record: CommittedRecord);
}

/// In-memory sink: backs the archive view and the tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CommittedRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<CommittedRecord> {
        self.records.lock().expect("sink mutex poisoned").clone()
    }
}

impl CommitSink for MemorySink {
    fn deliver(&self, record: CommittedRecord) {
        self.records
            .lock()
            .expect("sink mutex poisoned")
            .push(record);
    }
}
