// src/analyze/mod.rs
//! Analysis boundary: provider abstraction over the remote content-
//! understanding service, plus mock and disabled clients for tests and
//! unconfigured deployments.

pub mod gemini;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use types::{
    AnalysisResult, DossierStatus, ExtractedInfo, MailCategory, MailSubCategory, PersonCount,
};

use crate::config::ai::AiConfig;

/// Everything the remote call can fail with. Recoverable and scoped to one
/// mail; the caller records the message and may retry.
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error("missing GEMINI_API_KEY environment variable")]
    MissingApiKey,
    #[error("analysis disabled by configuration")]
    Disabled,
    #[error("analysis transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
}

/// Trait object used by the engine and tests.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Analyze one mail body and return the structured result.
    async fn analyze(&self, content: &str, sender: &str)
        -> Result<AnalysisResult, AnalysisFailure>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynAnalysisClient = Arc<dyn AnalysisClient>;

/// Factory: build a client according to config and environment.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if `config.enabled == false`, returns a disabled client.
/// * Else builds the real Gemini provider.
pub fn build_client_from_config(config: &AiConfig) -> DynAnalysisClient {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockAnalyst::succeeding());
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_str() {
        "gemini" => Arc::new(gemini::GeminiClient::new(config.model.as_deref())),
        "mock" => Arc::new(MockAnalyst::succeeding()),
        other => {
            tracing::warn!(provider = other, "unknown analysis provider, disabling");
            Arc::new(DisabledClient)
        }
    }
}

/// Always fails with [`AnalysisFailure::Disabled`]; used when no provider is
/// configured.
pub struct DisabledClient;

#[async_trait]
impl AnalysisClient for DisabledClient {
    async fn analyze(
        &self,
        _content: &str,
        _sender: &str,
    ) -> Result<AnalysisResult, AnalysisFailure> {
        Err(AnalysisFailure::Disabled)
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic mock for tests and local runs: either returns a canned
/// result echoing the sender, or fails with a fixed message.
#[derive(Clone)]
pub struct MockAnalyst {
    failure: Option<String>,
}

impl MockAnalyst {
    pub fn succeeding() -> Self {
        Self { failure: None }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
        }
    }

    /// The canned result every successful mock call returns.
    pub fn canned_result(sender: &str) -> AnalysisResult {
        AnalysisResult {
            summary: format!("Demande de renseignements reçue de {sender}."),
            category: MailCategory::Renseignements,
            sub_category: MailSubCategory::Nuitees,
            status: DossierStatus::Nouveau,
            extracted_info: ExtractedInfo {
                nom_client: sender.to_string(),
                langue_mail: "fr".to_string(),
                ..ExtractedInfo::default()
            },
            draft_response:
                "Bonjour,\nMerci pour votre message. Nous revenons vers vous au plus vite.\nCordialement"
                    .to_string(),
        }
    }
}

#[async_trait]
impl AnalysisClient for MockAnalyst {
    async fn analyze(
        &self,
        _content: &str,
        sender: &str,
    ) -> Result<AnalysisResult, AnalysisFailure> {
        match &self.failure {
            Some(msg) => Err(AnalysisFailure::MalformedResponse(msg.clone())),
            None => Ok(Self::canned_result(sender)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_always_fails() {
        let c = DisabledClient;
        let err = c.analyze("body", "a@b.fr").await.unwrap_err();
        assert!(matches!(err, AnalysisFailure::Disabled));
    }

    #[tokio::test]
    async fn mock_analyst_echoes_sender() {
        let c = MockAnalyst::succeeding();
        let r = c.analyze("body", "sophie@ex.fr").await.unwrap();
        assert_eq!(r.extracted_info.nom_client, "sophie@ex.fr");
        assert_eq!(r.status, DossierStatus::Nouveau);
    }

    #[tokio::test]
    async fn failing_mock_reports_its_message() {
        let c = MockAnalyst::failing("quota exceeded");
        let err = c.analyze("body", "a@b.fr").await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
