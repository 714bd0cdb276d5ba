// src/inbox/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable, unique identifier of one incoming mail. Assigned by the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MailId(pub String);

impl MailId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MailId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MailId {
    fn from(s: &str) -> Self {
        MailId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailPlatform {
    Gmail,
    Outlook,
}

/// One unit of incoming correspondence. Immutable once admitted to the
/// working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMail {
    pub id: MailId,
    pub sender: String,
    pub sender_name: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub platform: MailPlatform,
}

#[async_trait::async_trait]
pub trait MailSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<IncomingMail>>;
    fn name(&self) -> &'static str;
}
