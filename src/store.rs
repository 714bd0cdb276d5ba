// src/store.rs
//! Per-mail processing state. All lifecycle mutation funnels through this
//! store so the Done⇔result and Error⇔error invariants live in one place.
//!
//! An id with no slot reads as Idle; writes for an id create the slot, so a
//! late-arriving result for a mail no longer in focus is still recorded
//! silently (the store is indexed by id, not by "currently viewed mail").

use std::collections::HashMap;

use serde::Serialize;

use crate::analyze::AnalysisResult;
use crate::inbox::types::MailId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Idle,
    Processing,
    Done,
    Error,
}

#[derive(Debug, Clone)]
struct Slot {
    state: ProcessingState,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProcessingStore {
    slots: HashMap<MailId, Slot>,
}

impl ProcessingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &MailId) -> ProcessingState {
        self.slots
            .get(id)
            .map(|s| s.state)
            .unwrap_or(ProcessingState::Idle)
    }

    pub fn result(&self, id: &MailId) -> Option<&AnalysisResult> {
        self.slots.get(id).and_then(|s| s.result.as_ref())
    }

    pub fn error(&self, id: &MailId) -> Option<&str> {
        self.slots.get(id).and_then(|s| s.error.as_deref())
    }

    /// Mark an analysis in flight. Clears any prior error (retry path) and
    /// any prior result, keeping result-iff-Done intact.
    pub fn set_processing(&mut self, id: &MailId) {
        self.slots.insert(
            id.clone(),
            Slot {
                state: ProcessingState::Processing,
                result: None,
                error: None,
            },
        );
    }

    /// Store a successful result; implies Done.
    pub fn set_result(&mut self, id: &MailId, result: AnalysisResult) {
        self.slots.insert(
            id.clone(),
            Slot {
                state: ProcessingState::Done,
                result: Some(result),
                error: None,
            },
        );
    }

    /// Store a failure message; implies Error. Overwrites any older message.
    pub fn set_error(&mut self, id: &MailId, message: impl Into<String>) {
        self.slots.insert(
            id.clone(),
            Slot {
                state: ProcessingState::Error,
                result: None,
                error: Some(message.into()),
            },
        );
    }

    /// Replace the draft response of a Done mail. Silent no-op when the mail
    /// is absent or not Done; the operator can only edit a received draft.
    pub fn mutate_draft(&mut self, id: &MailId, new_draft: impl Into<String>) {
        if let Some(slot) = self.slots.get_mut(id) {
            if slot.state == ProcessingState::Done {
                if let Some(result) = slot.result.as_mut() {
                    result.draft_response = new_draft.into();
                }
            }
        }
    }

    pub fn remove(&mut self, id: &MailId) {
        self.slots.remove(id);
    }
}
