//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DeepL subscription plan, which selects the API host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// DeepL API Free
    #[default]
    Free,
    /// DeepL API Pro
    Pro,
}

impl Plan {
    /// Base URL of the v2 API for this plan
    pub fn base_url(self) -> &'static str {
        match self {
            Plan::Free => "https://api-free.deepl.com/v2/",
            Plan::Pro => "https://api.deepl.com/v2/",
        }
    }

    /// Human readable plan name
    pub fn label(self) -> &'static str {
        match self {
            Plan::Free => "DeepL API Free",
            Plan::Pro => "DeepL API Pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Pro => write!(f, "pro"),
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" | "paid" => Ok(Plan::Pro),
            other => Err(format!("unknown plan '{}', expected 'free' or 'pro'", other)),
        }
    }
}

/// Translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Source language code, auto-detected when unset
    pub source_lang: Option<String>,
    /// Target language code
    pub target_lang: String,
}

impl TranslationRequest {
    /// Request with an auto-detected source language
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: None,
            target_lang: target_lang.into(),
        }
    }

    /// Translate from `source_lang` instead of detecting it
    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = Some(source_lang.into());
        self
    }
}

/// A single translated text together with the language DeepL detected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text
    pub text: String,
    /// Language code DeepL detected, or the override that was sent
    pub detected_source_language: String,
}

/// Character usage of the account in the current billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Characters translated so far
    pub character_count: u64,
    /// Characters allowed in the period
    pub character_limit: u64,
}

impl Usage {
    /// Share of the character limit already consumed, `None` when there is no limit
    pub fn fraction_used(&self) -> Option<f64> {
        if self.character_limit == 0 {
            return None;
        }
        Some(self.character_count as f64 / self.character_limit as f64)
    }
}

/// Body of a successful `translate` call
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TranslateResponse {
    pub translations: Vec<Translation>,
}

/// Entry of the `languages` endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LanguageEntry {
    pub language: String,
    pub name: String,
}

/// Error body returned by the API
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_base_url() {
        assert_eq!(Plan::Free.base_url(), "https://api-free.deepl.com/v2/");
        assert_eq!(Plan::Pro.base_url(), "https://api.deepl.com/v2/");
    }

    #[test]
    fn test_plan_from_str() {
        assert_eq!("free".parse::<Plan>().unwrap(), Plan::Free);
        assert_eq!(" Pro ".parse::<Plan>().unwrap(), Plan::Pro);
        assert!("enterprise".parse::<Plan>().is_err());
    }

    #[test]
    fn test_usage_fraction() {
        let usage = Usage {
            character_count: 250,
            character_limit: 1000,
        };
        assert_eq!(usage.fraction_used(), Some(0.25));

        let unlimited = Usage {
            character_count: 5,
            character_limit: 0,
        };
        assert_eq!(unlimited.fraction_used(), None);
    }

    #[test]
    fn test_translate_response_parsing() {
        let json = r#"{"translations":[{"text":"Hallo","detected_source_language":"EN"}]}"#;
        let parsed: TranslateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.translations[0],
            Translation {
                text: "Hallo".to_string(),
                detected_source_language: "EN".to_string(),
            }
        );
    }

    #[test]
    fn test_request_builder() {
        let request = TranslationRequest::new("Hello", "DE").with_source_lang("EN");
        assert_eq!(request.source_lang.as_deref(), Some("EN"));
        assert_eq!(request.target_lang, "DE");
    }
}
