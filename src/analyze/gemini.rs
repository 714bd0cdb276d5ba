// src/analyze/gemini.rs
//! Gemini provider: does the *real* remote call. Requires `GEMINI_API_KEY`.
//! The model is instructed to answer with a single JSON object matching
//! [`AnalysisResult`]; anything else is a malformed response.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AnalysisClient, AnalysisFailure, AnalysisResult};

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// System instruction for the hotel mail agent. Ported as-is; the response
/// language must follow the mail's language, so the prompt stays French.
const SYSTEM_INSTRUCTION: &str = r#"
IDENTITÉ ET RÔLE
Tu es Emma, agent IA spécialisé dans la gestion des emails pour un hôtel.

TES MISSIONS
1. Analyser le contenu du mail.
2. Extraire les informations (Nom, Dates, Pax, etc.).
3. Classifier le mail (Catégorie, Sous-catégorie, Statut).
4. Rédiger un brouillon de réponse professionnel (Validation humaine requise).
5. Préparer les données pour l'insertion en base de données.

RÈGLES ABSOLUES
- TU RÉPONDS TOUJOURS DANS LA LANGUE DU MAIL REÇU.
- N'INVENTE JAMAIS de tarifs ou disponibilités.
- Ton professionnel, courtois, haut de gamme.

CATÉGORIES DE CLASSIFICATION
- Renseignements (Séminaires, Nuitées, Restauration)
- PEC (Prise en charge)
- Factures
- Spams

STATUTS
- Nouveau, En attente d'informations du client, En attente d'action de l'hôtel, Option posée, Confirmé, Clos.
"#;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// `model_override`: pass Some("gemini-...") to override the default.
    pub fn new(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("inbox-triage/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or(DEFAULT_MODEL).to_string();
        Self {
            http,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(
        &self,
        content: &str,
        sender: &str,
    ) -> Result<AnalysisResult, AnalysisFailure> {
        if self.api_key.is_empty() {
            return Err(AnalysisFailure::MissingApiKey);
        }

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            response_mime_type: &'static str,
            temperature: f32,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            system_instruction: Content<'a>,
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig,
        }

        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: RespContent,
        }
        #[derive(Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }

        let prompt = format!(
            "Voici un nouvel email à traiter.\nExpéditeur: {sender}\nContenu:\n\"\"\"\n{content}\n\"\"\"\n\nAgis en tant qu'Emma et traite cet email selon tes instructions système.\nRetourne UNIQUEMENT un objet JSON."
        );

        let req = Req {
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.2,
            },
        };

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AnalysisFailure::Status(resp.status()));
        }

        let body: Resp = resp.json().await?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or("");
        if text.is_empty() {
            return Err(AnalysisFailure::MalformedResponse(
                "empty candidate text".to_string(),
            ));
        }

        serde_json::from_str::<AnalysisResult>(text)
            .map_err(|e| AnalysisFailure::MalformedResponse(e.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
