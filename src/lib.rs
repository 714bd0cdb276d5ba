// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analyze;
pub mod api;
pub mod commit;
pub mod config;
pub mod engine;
pub mod highlight;
pub mod inbox;
pub mod metrics;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{AnalysisClient, AnalysisFailure, AnalysisResult, DynAnalysisClient};
pub use crate::commit::{CommitSink, CommittedRecord, MemorySink};
pub use crate::engine::{BulkReport, ProcessError, TriageEngine};
pub use crate::highlight::{segment, Segment};
pub use crate::inbox::types::{IncomingMail, MailId, MailPlatform, MailSource};
pub use crate::store::ProcessingState;
