//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::core::models::Plan;

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// DeepL authentication key
    pub api_key: String,
    /// Subscription plan, selects the API host
    pub plan: Plan,
    /// Language code to translate into
    pub target_lang: String,
    /// Source language override, auto-detected when unset
    pub source_lang: Option<String>,
    /// Transport timeout per request
    pub timeout_ms: u64,
    /// Replaces the plan's API host, e.g. for a proxy
    pub base_url_override: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("DEEPL_API_KEY").unwrap_or_default(),
            plan: Plan::Free,
            target_lang: "NL".to_string(),
            source_lang: None,
            timeout_ms: 30000,
            base_url_override: None,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables.
    ///
    /// A missing `DEEPL_API_KEY` leaves the key empty so key-less commands still
    /// work; [`TranslatorConfig::validate`] rejects it before any request. Malformed
    /// values are errors.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from a variable lookup
    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("DEEPL_API_KEY").unwrap_or_default();

        let plan = lookup("DEEPL_PLAN")
            .unwrap_or_else(|| "free".to_string())
            .parse::<Plan>()
            .map_err(|e| anyhow::anyhow!("DEEPL_PLAN: {}", e))?;

        let target_lang = lookup("DEEPL_TARGET_LANG").unwrap_or_else(|| "NL".to_string());

        let source_lang = lookup("DEEPL_SOURCE_LANG").filter(|s| !s.trim().is_empty());

        let timeout_ms = lookup("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".to_string())
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("REQUEST_TIMEOUT_MS: {}", e))?;

        let base_url_override = lookup("DEEPL_API_URL");

        Ok(Self {
            api_key,
            plan,
            target_lang,
            source_lang,
            timeout_ms,
            base_url_override,
        })
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.target_lang.trim().is_empty() {
            return Err(anyhow::anyhow!("Target language is required"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Base URL every endpoint is resolved against, always ending in `/`
    pub fn base_url(&self) -> String {
        match &self.base_url_override {
            Some(url) if url.ends_with('/') => url.clone(),
            Some(url) => format!("{}/", url),
            None => self.plan.base_url().to_string(),
        }
    }

    /// Full URL of an API endpoint
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}{}", self.base_url(), name)
    }
}
