// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";

fn default_provider() -> String {
    "gemini".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "gemini" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// "ENV" means: read from GEMINI_API_KEY
    #[serde(default)]
    pub api_key: String,
    /// Optional model override; provider default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            api_key: String::new(),
            model: None,
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AiConfig = serde_json::from_str(&data)?;

        // Normalize provider
        cfg.provider = cfg.provider.to_lowercase();

        // Resolve api key if "ENV" (only worth failing over when enabled)
        if cfg.enabled && cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "gemini" => env::var("GEMINI_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing GEMINI_API_KEY env var"))?,
                "mock" => String::new(),
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        Ok(cfg)
    }

    /// Load from the default path; fall back to a disabled default if the
    /// file is missing or unreadable.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(DEFAULT_AI_CONFIG_PATH) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "no usable AI config, analysis disabled");
                Self::default()
            }
        }
    }
}
