// src/inbox/mod.rs
//! The working set: mails currently awaiting or undergoing processing.
//!
//! Admission dedups against ids already present (a duplicate fetch is not an
//! error and never resets an existing mail's state); removal happens only on
//! commit. Order is newest-first, matching the operator's inbox view.

pub mod providers;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::inbox::types::{IncomingMail, MailId};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("inbox_fetched_total", "Mails returned by the source.");
        describe_counter!("inbox_admitted_total", "Mails admitted to the working set.");
        describe_counter!(
            "inbox_dedup_total",
            "Fetched mails dropped as already-present ids."
        );
        describe_gauge!("inbox_size", "Current working-set size.");
    });
}

/// Outcome of one admission round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct AdmitOutcome {
    pub admitted: usize,
    pub duplicates: usize,
}

/// Order-preserving working set, keyed by mail id.
#[derive(Debug, Default)]
pub struct Inbox {
    mails: Vec<IncomingMail>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mails.is_empty()
    }

    pub fn contains(&self, id: &MailId) -> bool {
        self.mails.iter().any(|m| &m.id == id)
    }

    pub fn get(&self, id: &MailId) -> Option<&IncomingMail> {
        self.mails.iter().find(|m| &m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IncomingMail> {
        self.mails.iter()
    }

    /// Admit fetched mails, dropping any whose id is already present.
    /// New mails are prepended, in fetch order, ahead of the existing ones.
    pub fn admit(&mut self, fetched: Vec<IncomingMail>) -> AdmitOutcome {
        ensure_metrics_described();
        counter!("inbox_fetched_total").increment(fetched.len() as u64);

        let existing: HashSet<MailId> = self.mails.iter().map(|m| m.id.clone()).collect();
        let mut seen = existing;
        let mut fresh = Vec::with_capacity(fetched.len());
        let mut duplicates = 0usize;
        for mail in fetched {
            if seen.insert(mail.id.clone()) {
                fresh.push(mail);
            } else {
                duplicates += 1;
            }
        }

        let admitted = fresh.len();
        fresh.append(&mut self.mails);
        self.mails = fresh;

        counter!("inbox_admitted_total").increment(admitted as u64);
        counter!("inbox_dedup_total").increment(duplicates as u64);
        gauge!("inbox_size").set(self.mails.len() as f64);

        AdmitOutcome {
            admitted,
            duplicates,
        }
    }

    /// Remove one mail (on commit). Absent id is a no-op.
    pub fn remove(&mut self, id: &MailId) -> Option<IncomingMail> {
        let pos = self.mails.iter().position(|m| &m.id == id)?;
        let mail = self.mails.remove(pos);
        gauge!("inbox_size").set(self.mails.len() as f64);
        Some(mail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::inbox::types::MailPlatform;

    fn mk_mail(id: &str) -> IncomingMail {
        IncomingMail {
            id: id.into(),
            sender: format!("{id}@example.com"),
            sender_name: "Test Sender".into(),
            subject: "Sujet".into(),
            body: "Corps".into(),
            received_at: Utc::now(),
            platform: MailPlatform::Gmail,
        }
    }

    #[test]
    fn admit_dedups_against_present_ids() {
        let mut inbox = Inbox::new();
        let out = inbox.admit(vec![mk_mail("a"), mk_mail("b")]);
        assert_eq!(out.admitted, 2);

        let out = inbox.admit(vec![mk_mail("b"), mk_mail("c")]);
        assert_eq!(out.admitted, 1);
        assert_eq!(out.duplicates, 1);
        assert_eq!(inbox.len(), 3);
    }

    #[test]
    fn admit_dedups_within_one_batch_too() {
        let mut inbox = Inbox::new();
        let out = inbox.admit(vec![mk_mail("x"), mk_mail("x")]);
        assert_eq!(out.admitted, 1);
        assert_eq!(out.duplicates, 1);
    }

    #[test]
    fn new_mails_land_ahead_of_old_ones() {
        let mut inbox = Inbox::new();
        inbox.admit(vec![mk_mail("old")]);
        inbox.admit(vec![mk_mail("new")]);
        let ids: Vec<_> = inbox.iter().map(|m| m.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn remove_absent_id_is_a_noop() {
        let mut inbox = Inbox::new();
        inbox.admit(vec![mk_mail("a")]);
        assert!(inbox.remove(&"ghost".into()).is_none());
        assert_eq!(inbox.len(), 1);
    }
}
